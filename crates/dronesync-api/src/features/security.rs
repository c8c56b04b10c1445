// ── security_edition feature: log control ──

use strum::FromRepr;

use crate::command::{Arg, FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const CAPABILITIES: u16 = 0;
const DEACTIVATE_LOGS: u16 = 1;
const LOG_STORAGE_STATE: u16 = 2;

/// Bits of the security edition capabilities bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum SecurityCapability {
    DeactivateLogs = 0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum LogStorageState {
    Enabled = 0,
    Disabled = 1,
}

protocol_enum!(SecurityCapability, LogStorageState);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEvent {
    Capabilities(u64),
    LogStorageState(Option<LogStorageState>),
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<SecurityEvent>, Error> {
    if command.feature != FeatureTag::SECURITY_EDITION {
        return Ok(None);
    }
    let mut args = command.reader();
    match command.id {
        CAPABILITIES => Ok(Some(SecurityEvent::Capabilities(args.bitfield()?))),
        LOG_STORAGE_STATE => Ok(Some(SecurityEvent::LogStorageState(args.enumeration()?))),
        _ => Ok(None),
    }
}

pub fn deactivate_logs() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::SECURITY_EDITION, DEACTIVATE_LOGS)
}

/// Encode a capabilities event (device side).
pub fn capabilities(supported: u64) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::SECURITY_EDITION, CAPABILITIES).arg(Arg::U64(supported))
}

/// Encode a log storage state event (device side).
pub fn log_storage_state(state: LogStorageState) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::SECURITY_EDITION, LOG_STORAGE_STATE).enum_arg(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_capabilities() {
        assert_eq!(
            decode(&capabilities(0b1)).unwrap(),
            Some(SecurityEvent::Capabilities(0b1))
        );
    }

    #[test]
    fn deactivate_command_has_no_arguments() {
        assert!(deactivate_logs().args.is_empty());
    }
}
