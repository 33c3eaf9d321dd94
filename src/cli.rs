use std::fs;

use serde::Deserialize;
use serde_json::json;

use crate::calc::bonuses;
use crate::config::AppConfig;
use crate::data::loadout::EquipmentProjection;
use crate::data::params::CalculationParameters;
use crate::server::{self, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Encode,
    Decode,
    Bonuses,
    Status,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("encode") => Some(Command::Encode),
        Some("decode") => Some(Command::Decode),
        Some("bonuses") => Some(Command::Bonuses),
        Some("status") => Some(Command::Status),
        _ => None,
    }
}

pub async fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("usage: dpscalc <serve|encode|decode|bonuses|status>");
        return 2;
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => handle_serve(&config).await,
        Command::Encode => handle_encode(&config, args),
        Command::Decode => handle_decode(&config, args).await,
        Command::Bonuses => handle_bonuses(&config, args).await,
        Command::Status => handle_status(&config).await,
    }
}

async fn handle_serve(config: &AppConfig) -> i32 {
    match server::run_server(config).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EncodeInput {
    parameters: CalculationParameters,
    equipment: EquipmentProjection,
}

fn handle_encode(config: &AppConfig, args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: dpscalc encode <setup.json>");
        return 2;
    };
    let input: EncodeInput = match fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|err| err.to_string()))
    {
        Ok(input) => input,
        Err(err) => {
            eprintln!("failed to read setup '{path}': {err}");
            return 1;
        }
    };
    let Some(state) = build_state(config) else {
        return 1;
    };
    println!(
        "{}",
        state.seeds.encode_projection(&input.parameters, &input.equipment)
    );
    0
}

async fn handle_decode(config: &AppConfig, args: &[String]) -> i32 {
    let Some(seed) = args.get(2) else {
        eprintln!("usage: dpscalc decode <seed>");
        return 2;
    };
    let Some(state) = ready_state(config).await else {
        return 1;
    };
    match state.seeds.decode(seed).await {
        Ok(decoded) => print_json(&json!({
            "parameters": decoded.parameters,
            "equipment": decoded.loadout,
        })),
        Err(err) => {
            eprintln!("invalid seed: {err}");
            1
        }
    }
}

async fn handle_bonuses(config: &AppConfig, args: &[String]) -> i32 {
    let Some(seed) = args.get(2) else {
        eprintln!("usage: dpscalc bonuses <seed>");
        return 2;
    };
    let Some(state) = ready_state(config).await else {
        return 1;
    };
    match state.seeds.decode(seed).await {
        Ok(decoded) => {
            let style = decoded.parameters.combat_style();
            let attack_type = decoded.parameters.attack_type();
            let totals = bonuses::totals(&decoded.loadout, &attack_type);
            print_json(&json!({
                "combat_style": style,
                "attack_type": attack_type,
                "totals": totals,
                "patch": totals.patch_for(style),
            }))
        }
        Err(err) => {
            eprintln!("invalid seed: {err}");
            1
        }
    }
}

async fn handle_status(config: &AppConfig) -> i32 {
    let Some(state) = build_state(config) else {
        return 1;
    };
    let loaded = state.lifecycle.initialize().await;
    let code = match server::api::reference_status_payload(&state) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize status: {err}");
            1
        }
    };
    if loaded.is_err() {
        1
    } else {
        code
    }
}

fn build_state(config: &AppConfig) -> Option<AppState> {
    match AppState::from_config(config) {
        Ok(state) => Some(state),
        Err(err) => {
            eprintln!("configuration error: {err}");
            None
        }
    }
}

/// State with reference data loaded. A failed load is reported but not fatal: item
/// lookups then go straight to the source.
async fn ready_state(config: &AppConfig) -> Option<AppState> {
    let state = build_state(config)?;
    if let Err(err) = state.lifecycle.initialize().await {
        eprintln!("warning: reference data unavailable: {err}");
    }
    Some(state)
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}
