use std::{env, fmt::Write as _, io::Cursor, path::PathBuf, thread::spawn};

use anyhow::{anyhow, Result};
use form_parts::{Config, Decoder, PartCollection};
use tiny_http::{Header, Request, Response, Server};

fn header<'a>(request: &'a Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h: &&Header| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn summary(parts: &PartCollection) -> Result<String> {
    let mut txt = String::new();

    for (name, parts) in parts {
        for part in parts {
            match &part.filename {
                Some(filename) => {
                    tracing::info!("file {} {} {}", name, filename, part.size());
                    writeln!(
                        txt,
                        "file {} {} {} {}\r",
                        name,
                        filename,
                        part.size(),
                        if part.is_spilled() { "disk" } else { "memory" }
                    )?;
                }
                None => {
                    let value = part.text()?;
                    tracing::info!("text {} {}", name, value);
                    writeln!(txt, "text {} {}\r", name, value)?;
                }
            }
        }
    }

    Ok(txt)
}

fn hello(config: Config, request: &mut Request) -> Result<Response<Cursor<Vec<u8>>>> {
    let m = header(request, "Content-Type")
        .and_then(|val| val.parse::<mime::Mime>().ok())
        .ok_or_else(|| anyhow!("missing content type"))?;
    let boundary = m
        .get_param(mime::BOUNDARY)
        .ok_or_else(|| anyhow!("missing boundary"))?
        .as_str()
        .to_string();
    let length = request
        .body_length()
        .ok_or_else(|| anyhow!("missing content length"))? as u64;
    let client = header(request, "User-Agent").unwrap_or_default().to_string();

    let parts = Decoder::with_config(request.as_reader(), length, boundary, config)
        .client(client)
        .decode()?;

    Ok(Response::from_string(summary(&parts)?))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        // From env var: `RUST_LOG`
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| anyhow!(e))?;

    let mut arg = env::args()
        .find(|a| a.starts_with("--spill="))
        .unwrap_or_else(|| "--spill=1024".to_string());

    // KB
    let spill = arg.split_off(8).parse::<u64>().unwrap_or(1024) * 1024;
    let config = Config::default()
        .spill_threshold(spill)
        .temp_dir(env::var_os("UPLOAD_DIR").map_or_else(env::temp_dir, PathBuf::from));

    let server = Server::http("0.0.0.0:3000").map_err(|e| anyhow!(e))?;
    println!("Now listening on port 3000");

    for mut request in server.incoming_requests() {
        let config = config.clone();
        spawn(move || {
            let response = match hello(config, &mut request) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("{}", e);
                    Response::from_string(e.to_string()).with_status_code(400)
                }
            };
            let _ = request.respond(response);
        });
    }

    Ok(())
}
