//! # Leg Identity and Joint Angle Types
//!
//! The robot has exactly four legs. Data belonging to each leg is stored in a [`Legs`] container
//! addressed by [`LegConfig`], so that the front-right/front-left/back-right/back-left
//! association is checked by the compiler rather than by array position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of legs on the robot.
pub const NUM_LEGS: usize = 4;

/// Number of joints in each leg.
pub const NUM_JOINTS: usize = 3;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Position of a leg on the body.
///
/// The index of each configuration is fixed and is the order used in every positional array
/// exchanged with the outside world (including the wire messages).
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum LegConfig {
    FrontRight,
    FrontLeft,
    BackRight,
    BackLeft,
}

/// A joint in a single leg, ordered from the body outwards.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Joint {
    Hip,
    Shoulder,
    Elbow,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One value of `T` for each leg of the robot.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Legs<T> {
    pub front_right: T,
    pub front_left: T,
    pub back_right: T,
    pub back_left: T,
}

/// The angles of the three joints in a leg.
///
/// Units: radians
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub hip_rad: f32,
    pub shoulder_rad: f32,
    pub elbow_rad: f32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LegConfig {
    /// All configurations in index order.
    pub const ALL: [LegConfig; NUM_LEGS] = [
        LegConfig::FrontRight,
        LegConfig::FrontLeft,
        LegConfig::BackRight,
        LegConfig::BackLeft,
    ];

    /// Position of this leg in positional arrays.
    pub fn index(self) -> usize {
        match self {
            LegConfig::FrontRight => 0,
            LegConfig::FrontLeft => 1,
            LegConfig::BackRight => 2,
            LegConfig::BackLeft => 3,
        }
    }

    /// Get the configuration at the given positional index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// True for legs on the left side of the body, whose targets must be mirrored into the
    /// right-side frame before solving.
    pub fn is_left(self) -> bool {
        matches!(self, LegConfig::FrontLeft | LegConfig::BackLeft)
    }

    /// Human readable name of the leg.
    pub fn label(self) -> &'static str {
        match self {
            LegConfig::FrontRight => "Front right",
            LegConfig::FrontLeft => "Front left",
            LegConfig::BackRight => "Back right",
            LegConfig::BackLeft => "Back left",
        }
    }
}

impl Joint {
    /// All joints in index order.
    pub const ALL: [Joint; NUM_JOINTS] = [Joint::Hip, Joint::Shoulder, Joint::Elbow];

    /// Position of this joint in positional arrays (0 = hip, 1 = shoulder, 2 = elbow).
    pub fn index(self) -> usize {
        match self {
            Joint::Hip => 0,
            Joint::Shoulder => 1,
            Joint::Elbow => 2,
        }
    }

    /// Get the joint at the given positional index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl<T> Legs<T> {
    /// Build the container by calling `f` once per leg, in index order.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(LegConfig) -> T,
    {
        let front_right = f(LegConfig::FrontRight);
        let front_left = f(LegConfig::FrontLeft);
        let back_right = f(LegConfig::BackRight);
        let back_left = f(LegConfig::BackLeft);

        Self {
            front_right,
            front_left,
            back_right,
            back_left,
        }
    }

    /// Build the container from a positional array in index order.
    pub fn from_array(array: [T; NUM_LEGS]) -> Self {
        let [front_right, front_left, back_right, back_left] = array;

        Self {
            front_right,
            front_left,
            back_right,
            back_left,
        }
    }

    /// Apply `f` to each leg's value, producing a new container.
    pub fn map<U, F>(&self, mut f: F) -> Legs<U>
    where
        F: FnMut(LegConfig, &T) -> U,
    {
        Legs::from_fn(|leg| f(leg, &self[leg]))
    }

    /// Iterate over the legs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (LegConfig, &T)> {
        LegConfig::ALL.iter().map(move |&leg| (leg, &self[leg]))
    }
}

impl<T: Copy> Legs<T> {
    /// Create a container holding the same value for every leg.
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value)
    }

    /// Convert into a positional array in index order.
    pub fn to_array(&self) -> [T; NUM_LEGS] {
        [
            self.front_right,
            self.front_left,
            self.back_right,
            self.back_left,
        ]
    }
}

impl<T> Index<LegConfig> for Legs<T> {
    type Output = T;

    fn index(&self, leg: LegConfig) -> &T {
        match leg {
            LegConfig::FrontRight => &self.front_right,
            LegConfig::FrontLeft => &self.front_left,
            LegConfig::BackRight => &self.back_right,
            LegConfig::BackLeft => &self.back_left,
        }
    }
}

impl<T> IndexMut<LegConfig> for Legs<T> {
    fn index_mut(&mut self, leg: LegConfig) -> &mut T {
        match leg {
            LegConfig::FrontRight => &mut self.front_right,
            LegConfig::FrontLeft => &mut self.front_left,
            LegConfig::BackRight => &mut self.back_right,
            LegConfig::BackLeft => &mut self.back_left,
        }
    }
}

impl JointAngles {
    pub fn new(hip_rad: f32, shoulder_rad: f32, elbow_rad: f32) -> Self {
        Self {
            hip_rad,
            shoulder_rad,
            elbow_rad,
        }
    }

    /// Read the angle of a single joint.
    pub fn get(&self, joint: Joint) -> f32 {
        match joint {
            Joint::Hip => self.hip_rad,
            Joint::Shoulder => self.shoulder_rad,
            Joint::Elbow => self.elbow_rad,
        }
    }

    /// Overwrite the angle of a single joint.
    pub fn set(&mut self, joint: Joint, value_rad: f32) {
        match joint {
            Joint::Hip => self.hip_rad = value_rad,
            Joint::Shoulder => self.shoulder_rad = value_rad,
            Joint::Elbow => self.elbow_rad = value_rad,
        }
    }

    /// The angles in degrees, ordered hip, shoulder, elbow.
    pub fn to_degrees(&self) -> [f32; NUM_JOINTS] {
        [
            self.hip_rad.to_degrees(),
            self.shoulder_rad.to_degrees(),
            self.elbow_rad.to_degrees(),
        ]
    }

    /// True if all three angles are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.hip_rad.is_finite() && self.shoulder_rad.is_finite() && self.elbow_rad.is_finite()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
