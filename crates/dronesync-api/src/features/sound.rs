// ── ardrone3 sound / sound state ──

use strum::FromRepr;

use crate::command::{FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const START_ALERT_SOUND: u16 = 0;
const STOP_ALERT_SOUND: u16 = 1;

const ALERT_SOUND: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum AlertSoundState {
    Stopped = 0,
    Playing = 1,
}

protocol_enum!(AlertSoundState);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundEvent {
    AlertSound(Option<AlertSoundState>),
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<SoundEvent>, Error> {
    if command.feature != FeatureTag::ARDRONE3_SOUND_STATE {
        return Ok(None);
    }
    match command.id {
        ALERT_SOUND => Ok(Some(SoundEvent::AlertSound(
            command.reader().enumeration()?,
        ))),
        _ => Ok(None),
    }
}

pub fn start_alert_sound() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND, START_ALERT_SOUND)
}

pub fn stop_alert_sound() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND, STOP_ALERT_SOUND)
}

/// Encode an alert sound state event (device side).
pub fn alert_sound_state(state: AlertSoundState) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND_STATE, ALERT_SOUND).enum_arg(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Arg;

    #[test]
    fn decodes_alert_state() {
        let cmd = ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND_STATE, ALERT_SOUND)
            .arg(Arg::Enum(1));
        assert_eq!(
            decode(&cmd).unwrap(),
            Some(SoundEvent::AlertSound(Some(AlertSoundState::Playing)))
        );
    }

    #[test]
    fn unknown_state_value_decodes_to_none() {
        let cmd = ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND_STATE, ALERT_SOUND)
            .arg(Arg::Enum(9));
        assert_eq!(decode(&cmd).unwrap(), Some(SoundEvent::AlertSound(None)));
    }

    #[test]
    fn unknown_command_id_is_dropped() {
        let cmd = ProtocolCommand::new(FeatureTag::ARDRONE3_SOUND_STATE, 42);
        assert_eq!(decode(&cmd).unwrap(), None);
    }
}
