//! Built-in game callback events
//!
//! The game server's native callback surface, registered once at session
//! startup so script code can listen to it without registering each
//! event by hand. Pure data; the registry treats these like any other
//! event.

use crate::registry::EventRegistry;

/// (name, format) pairs for the server's native callbacks.
pub const BUILTIN_EVENTS: &[(&str, &str)] = &[
    ("OnGameModeInit", ""),
    ("OnGameModeExit", ""),
    ("OnFilterScriptInit", ""),
    ("OnFilterScriptExit", ""),
    ("OnPlayerConnect", "i"),
    ("OnPlayerDisconnect", "ii"),
    ("OnPlayerSpawn", "i"),
    ("OnPlayerDeath", "iii"),
    ("OnVehicleSpawn", "i"),
    ("OnVehicleDeath", "ii"),
    ("OnPlayerText", "is"),
    ("OnPlayerCommandText", "is"),
    ("OnPlayerRequestClass", "ii"),
    ("OnPlayerEnterVehicle", "iii"),
    ("OnPlayerExitVehicle", "ii"),
    ("OnPlayerStateChange", "iii"),
    ("OnPlayerEnterCheckpoint", "i"),
    ("OnPlayerLeaveCheckpoint", "i"),
    ("OnPlayerEnterRaceCheckpoint", "i"),
    ("OnPlayerLeaveRaceCheckpoint", "i"),
    ("OnRconCommand", "s"),
    ("OnPlayerRequestSpawn", "i"),
    ("OnObjectMoved", "i"),
    ("OnPlayerObjectMoved", "ii"),
    ("OnPlayerPickUpPickup", "ii"),
    ("OnVehicleMod", "iii"),
    ("OnEnterExitModShop", "iii"),
    ("OnVehiclePaintjob", "iii"),
    ("OnVehicleRespray", "iiii"),
    ("OnVehicleDamageStatusUpdate", "ii"),
    ("OnUnoccupiedVehicleUpdate", "iiiffffff"),
    ("OnPlayerSelectedMenuRow", "ii"),
    ("OnPlayerExitedMenu", "i"),
    ("OnPlayerInteriorChange", "iii"),
    ("OnPlayerKeyStateChange", "iii"),
    ("OnRconLoginAttempt", "ssi"),
    ("OnPlayerUpdate", "i"),
    ("OnPlayerStreamIn", "ii"),
    ("OnPlayerStreamOut", "ii"),
    ("OnVehicleStreamIn", "ii"),
    ("OnVehicleStreamOut", "ii"),
    ("OnActorStreamIn", "ii"),
    ("OnActorStreamOut", "ii"),
    ("OnDialogResponse", "iiiis"),
    ("OnPlayerTakeDamage", "iifii"),
    ("OnPlayerGiveDamage", "iifii"),
    ("OnPlayerGiveDamageActor", "iifii"),
    ("OnPlayerClickMap", "ifff"),
    ("OnPlayerClickTextDraw", "ii"),
    ("OnPlayerClickPlayerTextDraw", "ii"),
    ("OnIncomingConnection", "isi"),
    ("OnTrailerUpdate", "ii"),
    ("OnVehicleSirenStateChange", "iii"),
    ("OnPlayerFinishedDownloading", "ii"),
    ("OnPlayerRequestDownload", "iii"),
    ("OnPlayerClickPlayer", "iii"),
    ("OnPlayerEditObject", "iiiiffffff"),
    ("OnPlayerEditAttachedObject", "iiiiifffffffff"),
    ("OnPlayerSelectObject", "iiiifff"),
    ("OnPlayerWeaponShot", "iiiifff"),
    ("OnClientCheckResponse", "iiii"),
    ("OnScriptCash", "iii"),
];

/// Register the built-in table. Names already present are left alone.
pub fn register_builtins(registry: &mut EventRegistry) {
    for (name, format) in BUILTIN_EVENTS {
        match registry.register(name, format) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(event = name, "built-in event already registered"),
            Err(e) => tracing::warn!(event = name, error = %e, "built-in event rejected"),
        }
    }
}
