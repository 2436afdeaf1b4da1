use serde::{Deserialize, Serialize};

// ControlInput is produced once per tick by exactly one controller (a human
// input mapping or an autonomous driver) and consumed by the physics step
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub throttle: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub brake: bool,
    pub turbo: bool,
    pub handbrake: bool,
}

impl ControlInput {
    pub fn coast() -> Self {
        ControlInput::default()
    }

    // +1 for left, -1 for right, 0 when neither (or both) are held
    pub fn steer_direction(&self) -> i8 {
        match (self.steer_left, self.steer_right) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControlInput;

    #[test]
    fn test_steer_direction() {
        let mut input = ControlInput::coast();
        assert_eq!(input.steer_direction(), 0);
        input.steer_left = true;
        assert_eq!(input.steer_direction(), 1);
        input.steer_right = true;
        assert_eq!(input.steer_direction(), 0);
        input.steer_left = false;
        assert_eq!(input.steer_direction(), -1);
    }
}
