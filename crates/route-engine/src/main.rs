use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use corridor_core::{CountryApiClient, FrontierSearch, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: corridor <from-name> <to-name>");
    }
    let from_name = &args[1];
    let to_name = &args[2];

    // Point CORRIDOR_API_URL at a mirror when the public instance is slow.
    let base_url = env::var("CORRIDOR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = CountryApiClient::new(&base_url);

    let directory = client
        .load_directory()
        .await
        .context("failed to load the node catalog")?;

    let source = directory.resolve(from_name)?.clone();
    let destination = directory.resolve(to_name)?.clone();

    println!("Calculating a route from {from_name} to {to_name}...");

    let search = FrontierSearch::new(Arc::new(client));
    match search.run(&source, &destination).await {
        Ok(result) => match result.route {
            Some(route) => {
                let names: Vec<&str> = route
                    .iter()
                    .map(|id| directory.display_name(id).unwrap_or_else(|| id.as_str()))
                    .collect();
                println!(
                    "The route may be: {}. Requests: {}",
                    names.join(", "),
                    result.lookups
                );
            }
            None => {
                println!(
                    "There is no route from {} to {}. Requests: {}",
                    from_name, to_name, result.lookups
                );
            }
        },
        Err(err) => {
            bail!(
                "route calculation failed after {} request(s): {err}",
                err.lookups()
            );
        }
    }

    Ok(())
}
