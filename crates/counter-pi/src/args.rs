use counter_core::{ConnectionParams, HostInit};

#[derive(Debug)]
pub enum Args {
    /// Host parameters given one by one.
    Split(SplitArgs),
    /// The host's `connectElgatoStreamDeckSocket` object as a single JSON argument.
    Init(String),
}

#[derive(Debug)]
pub struct SplitArgs {
    ws_port: u16,
    uuid: String,
    register_event: String,
    info_json: Option<String>,
    action_info: String,
}

fn take(argv: &mut Vec<String>, key: &str) -> anyhow::Result<String> {
    let idx = argv
        .iter()
        .position(|v| v == key)
        .ok_or_else(|| anyhow::anyhow!("missing arg {key}"))?;
    if idx + 1 >= argv.len() {
        return Err(anyhow::anyhow!("missing value for {key}"));
    }
    let value = argv.remove(idx + 1);
    argv.remove(idx);
    Ok(value)
}

fn take_opt(argv: &mut Vec<String>, key: &str) -> Option<String> {
    let idx = argv.iter().position(|v| v == key)?;
    if idx + 1 >= argv.len() {
        return None;
    }
    let value = argv.remove(idx + 1);
    argv.remove(idx);
    Some(value)
}

impl Args {
    pub fn parse(mut argv: Vec<String>) -> anyhow::Result<Self> {
        if let Some(init) = take_opt(&mut argv, "--init-json") {
            return Ok(Args::Init(init));
        }

        let ws_port: u16 = take(&mut argv, "--ws-port")?.parse()?;
        let uuid = take(&mut argv, "--uuid")?;
        let register_event = take_opt(&mut argv, "--register-event")
            .unwrap_or_else(|| "registerPropertyInspector".to_owned());
        let info_json = take_opt(&mut argv, "--info-json");
        let action_info = take(&mut argv, "--action-info")?;

        if !argv.is_empty() {
            log::warn!("ignoring unrecognised arguments: {argv:?}");
        }

        Ok(Args::Split(SplitArgs {
            ws_port,
            uuid,
            register_event,
            info_json,
            action_info,
        }))
    }

    pub fn into_params(self) -> anyhow::Result<ConnectionParams> {
        match self {
            Args::Init(json) => {
                let init: HostInit = serde_json::from_str(&json)?;
                Ok(init.into())
            }
            Args::Split(a) => {
                let info = match a.info_json {
                    Some(info) => serde_json::from_str(&info)?,
                    None => serde_json::Value::Null,
                };
                Ok(ConnectionParams {
                    port: a.ws_port,
                    registration_event: a.register_event,
                    inspector_uuid: a.uuid,
                    info,
                    action_info: a.action_info,
                })
            }
        }
    }
}
