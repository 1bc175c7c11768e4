use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::model::{Cell, Role};

/// A cell whose role is certain. Serializes as `{row, column, role}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Deduction {
    #[serde(flatten)]
    pub cell: Cell,
    pub role: Role,
}

impl Debug for Deduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.cell, self.role.token())
    }
}

impl Deduction {
    pub fn new(cell: Cell, role: Role) -> Self {
        Self { cell, role }
    }

    #[cfg(test)]
    /// Parse the debug form, e.g. "r1c2 is good".
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != 3 || parts[1] != "is" {
            panic!("Invalid deduction: {}", input);
        }
        let role = match parts[2] {
            "good" => Role::Good,
            "bad" => Role::Bad,
            _ => panic!("Invalid deduction: {}", input),
        };
        Self {
            cell: Cell::parse(parts[0]),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let deduction = Deduction::parse("r2c3 is bad");
        assert_eq!(deduction.cell, Cell::new(2, 3));
        assert_eq!(deduction.role, Role::Bad);
    }

    #[test]
    fn test_debug_representation() {
        let deduction = Deduction::new(Cell::new(1, 2), Role::Good);
        assert_eq!(format!("{:?}", deduction), "r1c2 is good");
    }

    #[test]
    fn test_serialized_shape() {
        let deduction = Deduction::new(Cell::new(1, 2), Role::Good);
        let json = serde_json::to_string(&deduction).unwrap();
        assert_eq!(json, r#"{"row":1,"column":2,"role":"good"}"#);
        let back: Deduction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deduction);
    }
}
