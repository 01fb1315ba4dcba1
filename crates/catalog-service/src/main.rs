use catalog_engine::tracing::setup_tracing;
use catalog_engine::{raw_params, RawParams};
use catalog_service::{query_string, CatalogSystem, ServiceError};
use std::process::ExitCode;
use tracing::{error, info, Instrument};

const USAGE: &str = "usage: catalog-service [<resource> [query-string]]";

#[tokio::main]
async fn main() -> ExitCode {
    // Setup tracing once for the entire application
    setup_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 2 || args.first().is_some_and(|a| a == "-h" || a == "--help") {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }

    let system = match CatalogSystem::from_env().await {
        Ok(system) => system,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let served = match args.as_slice() {
        [resource] => answer(&system, resource, &RawParams::new()).await,
        [resource, query] => answer(&system, resource, &query_string::parse(query)).await,
        _ => demo(&system).await,
    };

    if let Err(e) = system.shutdown().await {
        error!(error = %e, "Shutdown failed");
        return ExitCode::FAILURE;
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Request failed");
            ExitCode::FAILURE
        }
    }
}

/// Prints the response body, or the error body on failure.
async fn answer(
    system: &CatalogSystem,
    resource: &str,
    params: &RawParams,
) -> Result<(), ServiceError> {
    match system.engine.respond(resource, params).await {
        Ok(response) => {
            println!("{}", response.to_json()?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string(&e.to_body())?);
            Err(e.into())
        }
    }
}

/// Runs an unfiltered and a narrowed query against every resource.
async fn demo(system: &CatalogSystem) -> Result<(), ServiceError> {
    info!("Running demo queries over every resource");

    let names: Vec<String> = system
        .engine
        .registry()
        .names()
        .map(str::to_string)
        .collect();

    for resource in names {
        let span = tracing::info_span!("demo", %resource);
        async {
            let all = system.engine.query(&resource, &RawParams::new()).await?;
            info!(total = all.page.total, "Unfiltered");

            let narrowed = system
                .engine
                .query(
                    &resource,
                    &raw_params([("sortBy", "Prijs"), ("sortOrder", "desc"), ("limit", "3")]),
                )
                .await?;
            for item in &narrowed.page.items {
                info!(item = %serde_json::to_string(item)?, "Most expensive");
            }
            Ok::<(), ServiceError>(())
        }
        .instrument(span)
        .await?;
    }

    println!(
        "{}",
        system
            .engine
            .respond("batteries", &query_string::parse("Compatibel+met=SMA&Capaciteit+(kWh)_max=8"))
            .await?
            .to_json()?
    );
    Ok(())
}
