use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meetup_client::MeetupClient;
use meetup_graph::GraphClient;
use meetup_import::{
    write_topic_chart, Cli, GraphStore, ImportOptions, Importer, MeetupApi, Neo4jStore, Settings,
};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meetup=info".parse()?))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(cli)?;
    let config = &settings.file;
    config.log_redacted();

    info!(
        event_id = %settings.event_id,
        skip_schema_setup = settings.skip_schema_setup,
        drop_db_on_init = settings.drop_db_on_init,
        "Meetup import starting"
    );

    let api: Arc<dyn MeetupApi> = Arc::new(
        MeetupClient::new(config.meetup_api_key.clone())
            .with_base_url(config.meetup_api_url.as_str())
            .with_member_groups_interval(config.member_groups_interval()),
    );

    let client = GraphClient::connect(&config.neo4j_uri(), &config.neo4j_user, &config.neo4j_password)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.neo4j_uri()))?;
    let store: Arc<dyn GraphStore> = Arc::new(Neo4jStore::new(client));

    let options = ImportOptions {
        skip_schema_setup: settings.skip_schema_setup,
        drop_db_on_init: settings.drop_db_on_init,
    };
    let summary = Importer::new(api, store.clone(), options)
        .run(&settings.event_id)
        .await?;

    let topics = write_topic_chart(
        store.as_ref(),
        &summary.event_id,
        &summary.event_name,
        &settings.output_path,
    )
    .await?;

    info!(
        event_id = %summary.event_id,
        group_id = summary.group_id,
        members = summary.members,
        groups = summary.groups,
        participants = summary.participants,
        declined = summary.declined,
        unmatched_rsvps = summary.unmatched_rsvps,
        topics,
        output = %settings.output_path.display(),
        "Done"
    );
    Ok(())
}
