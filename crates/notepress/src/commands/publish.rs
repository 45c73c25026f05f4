//! `notepress publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use notepress_config::{CliSettings, Config, WordPressConfig};
use notepress_images::CopyTranscoder;
use notepress_renderer::ArticlePipeline;
use notepress_wordpress::{ArticlePublisher, PublishReport, WordPressClient};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to the note to publish.
    note: PathBuf,

    /// Publish live instead of saving a draft.
    #[arg(long)]
    live: bool,

    /// Vault root directory (overrides config).
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover notepress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or the publish fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            vault_root: self.vault.clone(),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let wp_config = require_wordpress_config(&config, &output)?;

        let client = WordPressClient::new(
            &wp_config.base_url,
            &wp_config.username,
            &wp_config.app_password,
        );
        let pipeline = ArticlePipeline::new(&config.vault_resolved.root);
        let transcoder = CopyTranscoder::new(&config.vault_resolved.upload_dir);
        let publisher = ArticlePublisher::new(pipeline, transcoder, client);

        output.info(&format!("Publishing {}...", self.note.display()));
        let report = publisher.publish(&self.note, self.live)?;
        print_report(&output, &report, self.live);

        Ok(())
    }
}

fn require_wordpress_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a WordPressConfig, CliError> {
    config.require_wordpress().map_err(|err| {
        output.error("Error: WordPress configuration required in notepress.toml");
        output.info("\nAdd the following to your notepress.toml:");
        output.info("\n[wordpress]");
        output.info(r#"base_url = "https://blog.example.com""#);
        output.info(r#"username = "your-username""#);
        output.info(r#"app_password = "${WORDPRESS_APP_PASSWORD}""#);
        CliError::Validation(err.to_string())
    })
}

fn print_report(output: &Output, report: &PublishReport, live: bool) {
    let action = if report.updated_existing {
        "Updated"
    } else {
        "Created"
    };
    let status = if live { "published" } else { "draft" };

    output.highlight(&format!("{action} post: {}", report.title));
    output.success(&format!("  {} ({status})", report.url));
    output.info(&format!(
        "  Images: {} uploaded, {} failed",
        report.images_uploaded, report.images_failed
    ));
    if report.images_failed > 0 {
        output.warning("  Some images were skipped; their directives remain in the post body.");
    }
    output.info(&format!("  Took {:.1}s", report.elapsed.as_secs_f64()));
}
