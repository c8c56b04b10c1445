// ── Protocol command values ──
//
// A command is a feature tag, a command id inside that feature and a
// flat list of typed arguments. Decoding raw buffers into this shape is
// the link layer's job; everything above works on these values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::ProtocolEnum;
use crate::error::Error;

// ── FeatureTag ──────────────────────────────────────────────────────

/// Identifies the functional area a command belongs to.
///
/// The high byte is the protocol project (or feature id for "feature"
/// style projects), the low byte the class inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTag(pub u16);

impl FeatureTag {
    // ── common project ──
    pub const COMMON_SETTINGS: Self = Self(0x0002);
    pub const COMMON_SETTINGS_STATE: Self = Self(0x0003);
    pub const COMMON_CALIBRATION: Self = Self(0x000D);
    pub const COMMON_CALIBRATION_STATE: Self = Self(0x000E);
    pub const COMMON_FACTORY: Self = Self(0x000F);

    // ── ardrone3 project ──
    pub const ARDRONE3_SETTINGS_STATE: Self = Self(0x0110);
    pub const ARDRONE3_SOUND: Self = Self(0x0123);
    pub const ARDRONE3_SOUND_STATE: Self = Self(0x0124);

    // ── standalone features ──
    pub const CAMERA: Self = Self(0x8F00);
    pub const GAUGE_FW_UPDATER: Self = Self(0x9C00);
    pub const SECURITY_EDITION: Self = Self(0x9E00);

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// ── Arguments ───────────────────────────────────────────────────────

/// One typed command argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arg {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    /// Raw value of a protocol enum.
    Enum(i32),
    Str(String),
}

// ── ProtocolCommand ─────────────────────────────────────────────────

/// A decoded protocol command, inbound or outbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCommand {
    pub feature: FeatureTag,
    pub id: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,
}

impl ProtocolCommand {
    pub fn new(feature: FeatureTag, id: u16) -> Self {
        Self {
            feature,
            id,
            args: Vec::new(),
        }
    }

    /// Append an argument (builder style).
    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Append a protocol enum argument by raw value.
    pub fn enum_arg<E: ProtocolEnum>(self, value: E) -> Self {
        self.arg(Arg::Enum(value.to_raw()))
    }

    /// Cursor over the arguments, in declaration order.
    pub fn reader(&self) -> ArgReader<'_> {
        ArgReader {
            command: self,
            index: 0,
        }
    }
}

// ── ArgReader ───────────────────────────────────────────────────────

/// Sequential typed access to a command's arguments.
///
/// Every accessor fails with [`Error::MissingArgument`] or
/// [`Error::ArgumentType`] when the payload does not match the layout.
/// Enum accessors return `Ok(None)` for raw values this build does not
/// know, so callers can skip them without treating them as errors.
pub struct ArgReader<'a> {
    command: &'a ProtocolCommand,
    index: usize,
}

impl<'a> ArgReader<'a> {
    fn next(&mut self) -> Result<&'a Arg, Error> {
        let index = self.index;
        self.index += 1;
        self.command
            .args
            .get(index)
            .ok_or(Error::MissingArgument {
                feature: self.command.feature,
                command_id: self.command.id,
                index,
            })
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::ArgumentType {
            feature: self.command.feature,
            command_id: self.command.id,
            index: self.index.saturating_sub(1),
            expected,
        }
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        match self.next()? {
            Arg::U8(v) => Ok(*v),
            _ => Err(self.mismatch("u8")),
        }
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        match self.next()? {
            Arg::U8(v) => Ok(u32::from(*v)),
            Arg::U16(v) => Ok(u32::from(*v)),
            Arg::U32(v) => Ok(*v),
            _ => Err(self.mismatch("u32")),
        }
    }

    /// Any unsigned integer argument, widened to a 64-bit bitfield.
    pub fn bitfield(&mut self) -> Result<u64, Error> {
        match self.next()? {
            Arg::U8(v) => Ok(u64::from(*v)),
            Arg::U16(v) => Ok(u64::from(*v)),
            Arg::U32(v) => Ok(u64::from(*v)),
            Arg::U64(v) => Ok(*v),
            _ => Err(self.mismatch("bitfield")),
        }
    }

    pub fn string(&mut self) -> Result<String, Error> {
        match self.next()? {
            Arg::Str(v) => Ok(v.clone()),
            _ => Err(self.mismatch("string")),
        }
    }

    /// Raw value of an enum argument.
    pub fn enum_raw(&mut self) -> Result<i32, Error> {
        match self.next()? {
            Arg::Enum(v) | Arg::I32(v) => Ok(*v),
            _ => Err(self.mismatch("enum")),
        }
    }

    /// Enum argument mapped to `E`, `None` when the value is unknown.
    pub fn enumeration<E: ProtocolEnum>(&mut self) -> Result<Option<E>, Error> {
        let raw = self.enum_raw()?;
        Ok(E::from_raw(raw))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reader_reads_in_order() {
        let cmd = ProtocolCommand::new(FeatureTag::COMMON_SETTINGS_STATE, 3)
            .arg(Arg::Str("1.2.3".into()))
            .arg(Arg::U8(7));
        let mut r = cmd.reader();
        assert_eq!(r.string().unwrap(), "1.2.3");
        assert_eq!(r.u8().unwrap(), 7);
    }

    #[test]
    fn missing_argument_is_reported_with_index() {
        let cmd = ProtocolCommand::new(FeatureTag::COMMON_SETTINGS_STATE, 3);
        let err = cmd.reader().string().unwrap_err();
        assert!(matches!(err, Error::MissingArgument { index: 0, .. }));
        assert!(err.is_decode());
    }

    #[test]
    fn wrong_type_is_reported() {
        let cmd = ProtocolCommand::new(FeatureTag::CAMERA, 1).arg(Arg::Str("x".into()));
        let err = cmd.reader().u8().unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentType {
                index: 0,
                expected: "u8",
                ..
            }
        ));
    }

    #[test]
    fn bitfield_widens_smaller_integers() {
        let cmd = ProtocolCommand::new(FeatureTag::CAMERA, 1)
            .arg(Arg::U8(0b101))
            .arg(Arg::U32(1 << 20));
        let mut r = cmd.reader();
        assert_eq!(r.bitfield().unwrap(), 0b101);
        assert_eq!(r.bitfield().unwrap(), 1 << 20);
    }

    #[test]
    fn command_json_shape() {
        let cmd = ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND_STATE, 0).arg(Arg::Enum(1));
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "feature": 0x0124, "id": 0, "args": [{ "enum": 1 }] })
        );
    }

    #[test]
    fn feature_tag_displays_as_hex() {
        assert_eq!(FeatureTag::CAMERA.to_string(), "0x8f00");
    }
}
