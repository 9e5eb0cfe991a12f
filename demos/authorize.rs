use gatekeeper_authorizer::Authorizer;
use serde_json::Value;
use std::io::Read;
use std::{env, fs, io};

// Evaluates one authorizer event and prints the decision.
//
//   cargo run --example authorize -- event.json
//   echo '{"methodArn": "...", "authorizationToken": "Bearer ..."}' | cargo run --example authorize
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: Value = serde_json::from_str(&raw)?;

    let authorizer = Authorizer::from_env()?;
    let decision = authorizer.authorize_value(event);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
