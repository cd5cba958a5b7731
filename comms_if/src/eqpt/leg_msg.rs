//! # Leg Pose and Feedback Messages
//!
//! Pose messages carry demanded joint angles to the robot, feedback messages carry the measured
//! angles and body orientation back. Each message has a host-order form ([`Pose`],
//! [`Feedback`]) and a network-order twin ([`PoseSwapped`], [`FeedbackSwapped`]) with the same
//! layout, where every field is stored as a big endian 32 bit word. Floats are converted by
//! reinterpreting their bits, not their value, so the round trip is exact for any bit pattern.
//!
//! Leg arrays are in [`LegConfig`] index order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

use super::leg::{JointAngles, LegConfig, Legs, NUM_LEGS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Message type tag of a [`Pose`].
pub const MSG_TYPE_POSE: u32 = 0;

/// Message type tag of a [`Feedback`].
pub const MSG_TYPE_FEEDBACK: u32 = 1;

const POSE_NUM_WORDS: usize = 2 + 3 * NUM_LEGS;
const FEEDBACK_NUM_WORDS: usize = 1 + 4 * NUM_LEGS;

/// Length of an encoded pose frame.
///
/// Units: bytes
pub const POSE_FRAME_LEN: usize = 4 * POSE_NUM_WORDS;

/// Length of an encoded feedback frame.
///
/// Units: bytes
pub const FEEDBACK_FRAME_LEN: usize = 4 * FEEDBACK_NUM_WORDS;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demanded joint angles for all legs, in host byte order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Pose {
    pub msg_type: u32,

    /// Units: radians
    pub hips: [f32; NUM_LEGS],

    /// Units: radians
    pub shoulders: [f32; NUM_LEGS],

    /// Units: radians
    pub elbows: [f32; NUM_LEGS],

    pub timestamp: u32,
}

/// Measured joint angles and body orientation, in host byte order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub msg_type: u32,

    /// Units: radians
    pub hips: [f32; NUM_LEGS],

    /// Units: radians
    pub shoulders: [f32; NUM_LEGS],

    /// Units: radians
    pub elbows: [f32; NUM_LEGS],

    /// Body orientation quaternion.
    pub orientation: [f32; 4],
}

/// A [`Pose`] with every field in network byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoseSwapped {
    pub msg_type: u32,
    pub hips: [u32; NUM_LEGS],
    pub shoulders: [u32; NUM_LEGS],
    pub elbows: [u32; NUM_LEGS],
    pub timestamp: u32,
}

/// A [`Feedback`] with every field in network byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSwapped {
    pub msg_type: u32,
    pub hips: [u32; NUM_LEGS],
    pub shoulders: [u32; NUM_LEGS],
    pub elbows: [u32; NUM_LEGS],
    pub orientation: [u32; 4],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LegMsgError {
    #[error("Expected a frame of {expected} bytes but got {found}")]
    WrongFrameLength { expected: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a host-order pose into its network-order form for transmission.
pub fn encode_pose(pose: &Pose) -> PoseSwapped {
    PoseSwapped {
        msg_type: pose.msg_type.to_be(),
        hips: encode_f32_array(&pose.hips),
        shoulders: encode_f32_array(&pose.shoulders),
        elbows: encode_f32_array(&pose.elbows),
        timestamp: pose.timestamp.to_be(),
    }
}

/// Convert a received network-order pose into host order.
pub fn decode_pose(swapped: &PoseSwapped) -> Pose {
    Pose {
        msg_type: u32::from_be(swapped.msg_type),
        hips: decode_f32_array(&swapped.hips),
        shoulders: decode_f32_array(&swapped.shoulders),
        elbows: decode_f32_array(&swapped.elbows),
        timestamp: u32::from_be(swapped.timestamp),
    }
}

/// Convert a host-order feedback message into its network-order form for transmission.
pub fn encode_feedback(feedback: &Feedback) -> FeedbackSwapped {
    FeedbackSwapped {
        msg_type: feedback.msg_type.to_be(),
        hips: encode_f32_array(&feedback.hips),
        shoulders: encode_f32_array(&feedback.shoulders),
        elbows: encode_f32_array(&feedback.elbows),
        orientation: encode_f32_array(&feedback.orientation),
    }
}

/// Convert a received network-order feedback message into host order.
pub fn decode_feedback(swapped: &FeedbackSwapped) -> Feedback {
    Feedback {
        msg_type: u32::from_be(swapped.msg_type),
        hips: decode_f32_array(&swapped.hips),
        shoulders: decode_f32_array(&swapped.shoulders),
        elbows: decode_f32_array(&swapped.elbows),
        orientation: decode_f32_array(&swapped.orientation),
    }
}

fn encode_f32_array(values: &[f32; 4]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (w, v) in words.iter_mut().zip(values.iter()) {
        *w = v.to_bits().to_be();
    }
    words
}

fn decode_f32_array(words: &[u32; 4]) -> [f32; 4] {
    let mut values = [0f32; 4];
    for (v, w) in values.iter_mut().zip(words.iter()) {
        *v = f32::from_bits(u32::from_be(*w));
    }
    values
}

fn array_from_words(words: &[u32]) -> [u32; 4] {
    let mut array = [0u32; 4];
    array.copy_from_slice(&words[..4]);
    array
}

fn check_frame_len(bytes: &[u8], expected: usize) -> Result<(), LegMsgError> {
    if bytes.len() != expected {
        Err(LegMsgError::WrongFrameLength {
            expected,
            found: bytes.len(),
        })
    } else {
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Pack a set of leg angles into a pose message.
    pub fn from_angles(angles: &Legs<JointAngles>, timestamp: u32) -> Self {
        Self {
            msg_type: MSG_TYPE_POSE,
            hips: angles.map(|_, a| a.hip_rad).to_array(),
            shoulders: angles.map(|_, a| a.shoulder_rad).to_array(),
            elbows: angles.map(|_, a| a.elbow_rad).to_array(),
            timestamp,
        }
    }

    /// Unpack the angles of each leg.
    pub fn angles(&self) -> Legs<JointAngles> {
        angles_from_arrays(&self.hips, &self.shoulders, &self.elbows)
    }
}

impl Feedback {
    /// Unpack the angles of each leg.
    pub fn angles(&self) -> Legs<JointAngles> {
        angles_from_arrays(&self.hips, &self.shoulders, &self.elbows)
    }
}

impl PoseSwapped {
    /// Write the message into a frame ready to be put on the wire.
    ///
    /// The fields already hold network-order words, so they are copied out without further
    /// reordering.
    pub fn to_bytes(&self) -> [u8; POSE_FRAME_LEN] {
        let mut words = [0u32; POSE_NUM_WORDS];
        words[0] = self.msg_type;
        words[1..5].copy_from_slice(&self.hips);
        words[5..9].copy_from_slice(&self.shoulders);
        words[9..13].copy_from_slice(&self.elbows);
        words[13] = self.timestamp;

        let mut bytes = [0u8; POSE_FRAME_LEN];
        NativeEndian::write_u32_into(&words, &mut bytes);
        bytes
    }

    /// Read a message from a frame received from the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LegMsgError> {
        check_frame_len(bytes, POSE_FRAME_LEN)?;

        let mut words = [0u32; POSE_NUM_WORDS];
        NativeEndian::read_u32_into(bytes, &mut words);

        Ok(Self {
            msg_type: words[0],
            hips: array_from_words(&words[1..5]),
            shoulders: array_from_words(&words[5..9]),
            elbows: array_from_words(&words[9..13]),
            timestamp: words[13],
        })
    }
}

impl FeedbackSwapped {
    /// Write the message into a frame ready to be put on the wire.
    pub fn to_bytes(&self) -> [u8; FEEDBACK_FRAME_LEN] {
        let mut words = [0u32; FEEDBACK_NUM_WORDS];
        words[0] = self.msg_type;
        words[1..5].copy_from_slice(&self.hips);
        words[5..9].copy_from_slice(&self.shoulders);
        words[9..13].copy_from_slice(&self.elbows);
        words[13..17].copy_from_slice(&self.orientation);

        let mut bytes = [0u8; FEEDBACK_FRAME_LEN];
        NativeEndian::write_u32_into(&words, &mut bytes);
        bytes
    }

    /// Read a message from a frame received from the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LegMsgError> {
        check_frame_len(bytes, FEEDBACK_FRAME_LEN)?;

        let mut words = [0u32; FEEDBACK_NUM_WORDS];
        NativeEndian::read_u32_into(bytes, &mut words);

        Ok(Self {
            msg_type: words[0],
            hips: array_from_words(&words[1..5]),
            shoulders: array_from_words(&words[5..9]),
            elbows: array_from_words(&words[9..13]),
            orientation: array_from_words(&words[13..17]),
        })
    }
}

fn angles_from_arrays(
    hips: &[f32; NUM_LEGS],
    shoulders: &[f32; NUM_LEGS],
    elbows: &[f32; NUM_LEGS],
) -> Legs<JointAngles> {
    Legs::from_fn(|leg: LegConfig| {
        let i = leg.index();
        JointAngles::new(hips[i], shoulders[i], elbows[i])
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::BigEndian;

    fn test_pose() -> Pose {
        Pose {
            msg_type: MSG_TYPE_POSE,
            hips: [0.0, -1.5, 3.25, f32::MAX],
            shoulders: [1.0e-30, -0.0, 2.0, f32::from_bits(0x7fc0_1234)],
            elbows: [f32::INFINITY, f32::NEG_INFINITY, 0.5, -7.75],
            timestamp: 0xdead_beef,
        }
    }

    fn test_feedback() -> Feedback {
        Feedback {
            msg_type: MSG_TYPE_FEEDBACK,
            hips: [3.1, 3.2, 3.3, 3.4],
            shoulders: [-0.1, -0.2, -0.3, -0.4],
            elbows: [f32::from_bits(0xffff_ffff), 1.0, 2.0, 4.0],
            orientation: [1.0, 0.0, 0.0, 0.0],
        }
    }

    fn bits(values: &[f32; 4]) -> [u32; 4] {
        let mut b = [0u32; 4];
        for (o, v) in b.iter_mut().zip(values.iter()) {
            *o = v.to_bits();
        }
        b
    }

    #[test]
    fn test_pose_round_trip_is_bit_exact() {
        let pose = test_pose();
        let back = decode_pose(&encode_pose(&pose));

        assert_eq!(back.msg_type, pose.msg_type);
        assert_eq!(back.timestamp, pose.timestamp);
        assert_eq!(bits(&back.hips), bits(&pose.hips));
        assert_eq!(bits(&back.shoulders), bits(&pose.shoulders));
        assert_eq!(bits(&back.elbows), bits(&pose.elbows));
    }

    #[test]
    fn test_feedback_round_trip_is_bit_exact() {
        let feedback = test_feedback();
        let back = decode_feedback(&encode_feedback(&feedback));

        assert_eq!(back.msg_type, feedback.msg_type);
        assert_eq!(bits(&back.hips), bits(&feedback.hips));
        assert_eq!(bits(&back.shoulders), bits(&feedback.shoulders));
        assert_eq!(bits(&back.elbows), bits(&feedback.elbows));
        assert_eq!(bits(&back.orientation), bits(&feedback.orientation));
    }

    #[test]
    fn test_pose_frame_is_big_endian() {
        let pose = test_pose();
        let frame = encode_pose(&pose).to_bytes();

        let mut expected = [0u8; POSE_FRAME_LEN];
        BigEndian::write_u32(&mut expected[0..4], pose.msg_type);
        BigEndian::write_f32_into(&pose.hips, &mut expected[4..20]);
        BigEndian::write_f32_into(&pose.shoulders, &mut expected[20..36]);
        BigEndian::write_f32_into(&pose.elbows, &mut expected[36..52]);
        BigEndian::write_u32(&mut expected[52..56], pose.timestamp);

        assert_eq!(frame.to_vec(), expected.to_vec());
        assert_eq!(&frame[52..56], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_frames_decode() {
        let pose_swapped = encode_pose(&test_pose());
        let frame = pose_swapped.to_bytes();
        assert_eq!(PoseSwapped::from_bytes(&frame), Ok(pose_swapped));

        let feedback_swapped = encode_feedback(&test_feedback());
        let frame = feedback_swapped.to_bytes();
        assert_eq!(frame.len(), FEEDBACK_FRAME_LEN);
        assert_eq!(FeedbackSwapped::from_bytes(&frame), Ok(feedback_swapped));
    }

    #[test]
    fn test_wrong_frame_length() {
        let frame = encode_pose(&test_pose()).to_bytes();

        assert_eq!(
            PoseSwapped::from_bytes(&frame[..POSE_FRAME_LEN - 1]),
            Err(LegMsgError::WrongFrameLength {
                expected: POSE_FRAME_LEN,
                found: POSE_FRAME_LEN - 1
            })
        );
        assert!(FeedbackSwapped::from_bytes(&frame).is_err());
    }

    #[test]
    fn test_pose_angles_packing() {
        let angles = Legs::from_fn(|leg| {
            let i = leg.index() as f32;
            JointAngles::new(i, i + 10.0, i + 20.0)
        });
        let pose = Pose::from_angles(&angles, 42);

        assert_eq!(pose.msg_type, MSG_TYPE_POSE);
        assert_eq!(pose.timestamp, 42);
        assert_eq!(pose.hips, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(pose.shoulders, [10.0, 11.0, 12.0, 13.0]);
        assert_eq!(pose.elbows, [20.0, 21.0, 22.0, 23.0]);
        assert_eq!(pose.angles(), angles);

        let feedback = test_feedback();
        let fb_angles = feedback.angles();
        assert_eq!(fb_angles[LegConfig::BackLeft].hip_rad, 3.4);
        assert_eq!(fb_angles[LegConfig::FrontLeft].shoulder_rad, -0.2);
    }
}
