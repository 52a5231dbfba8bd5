//! Game action definitions

use serde::{Deserialize, Serialize};

/// All actions a player can hold down during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // Movement
    MoveLeft,
    MoveRight,
    Jump,

    // Combat
    Attack, // melee swing
    Shoot,  // ranged shot
    Guard,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Attack,
        Action::Shoot,
        Action::Guard,
    ];
}
