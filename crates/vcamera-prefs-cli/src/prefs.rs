use std::collections::BTreeMap;

use color_eyre::eyre::{bail, Result};
use tracing::debug;
use vcamera_prefs::{MediumConfiguration, PreferenceStore, StoreCell, CAMERA_SETTINGS};

use crate::{
    command::{Commands, ValueType},
    render::{CommandOutput, CommandResult},
};

pub(crate) fn run(command: Commands, configuration: MediumConfiguration) -> CommandResult {
    debug!(?configuration, "Opening camera settings");
    let backend = configuration.open()?;
    let cell = StoreCell::new(CAMERA_SETTINGS);
    let store = cell.initialize(backend.as_ref())?;

    match command {
        Commands::Get { key, kind, default } => get(&store, &key, kind, default),
        Commands::Set { key, value, kind } => {
            store.set_value(&key, kind.parse(&value)?)?;
            commit(&store)
        }
        Commands::Remove { key } => {
            store.remove(&key)?;
            commit(&store)
        }
        Commands::Clear => {
            store.clear();
            commit(&store)
        }
        Commands::Keys => {
            let mut keys: Vec<String> = store.get_all_keys().into_iter().collect();
            keys.sort();
            Ok(CommandOutput::Object {
                plain: keys.join("\n"),
                json: serde_json::to_value(&keys)?,
            })
        }
        Commands::Dump => {
            let entries: BTreeMap<_, _> = store.entries().into_iter().collect();
            let plain = entries
                .iter()
                .map(|(key, value)| format!("{key} ({}) = {value}", value.kind()))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(CommandOutput::Object {
                plain,
                json: serde_json::to_value(&entries)?,
            })
        }
    }
}

fn get(
    store: &PreferenceStore,
    key: &str,
    kind: Option<ValueType>,
    default: Option<String>,
) -> CommandResult {
    let stored = store
        .get_value(key)
        .filter(|value| kind.is_none_or(|kind| value.kind() == kind.kind()));

    let value = match (stored, kind, default) {
        (Some(value), _, _) => value,
        (None, Some(kind), Some(default)) => kind.parse(&default)?,
        (None, Some(kind), None) if store.contains(key) => {
            bail!("Preference '{key}' does not hold a {} value", kind.kind())
        }
        (None, _, _) => bail!("Preference '{key}' not found"),
    };

    Ok(CommandOutput::Object {
        plain: value.to_string(),
        json: serde_json::to_value(&value)?,
    })
}

fn commit(store: &PreferenceStore) -> CommandResult {
    if !store.commit() {
        bail!("Failed to write camera settings to disk");
    }
    Ok(().into())
}
