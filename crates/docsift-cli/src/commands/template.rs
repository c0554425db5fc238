//! Template command - manage the stored template definitions.

use clap::{Args, Subcommand};
use console::style;

use docsift_core::{
    FieldPattern, JsonTemplateStore, PageSelector, SiftConfig, SiftError, TemplateStore,
};

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List the stored templates
    List,

    /// Show one template definition as JSON
    Show {
        /// Template id
        id: String,
    },

    /// Create a template definition
    Add {
        /// Template id (also the definition's file name)
        id: String,

        /// Human-readable title
        title: String,

        /// Regex whose match count scores the template
        regex: String,

        /// Page selection to score against
        #[arg(short, long, default_value = "1")]
        pages: PageSelector,

        /// OCR language for documents of this layout
        #[arg(short, long, default_value = "eng")]
        language: String,

        /// Replace an existing definition, dropping its field patterns
        #[arg(long = "override")]
        override_existing: bool,
    },

    /// Append a field pattern to a template
    AddPattern {
        /// Template id
        id: String,

        /// Key of the field in the output record
        title: String,

        /// Regex applied to the selected page text
        regex: String,

        /// Page selection to apply the regex to
        #[arg(short, long, default_value = "a")]
        pages: PageSelector,

        /// Collect every match instead of only the first
        #[arg(long)]
        multi: bool,

        /// Comma-delimited names for the capture groups, in group order
        #[arg(long, value_delimiter = ',')]
        assign: Option<Vec<String>>,
    },

    /// Remove a template definition
    Delete {
        /// Template id
        id: String,
    },
}

pub fn run(args: TemplateArgs, config: &SiftConfig) -> anyhow::Result<()> {
    let store = JsonTemplateStore::new(&config.templates_dir)?;

    match args.command {
        TemplateCommand::List => {
            let templates = store.list()?;
            if templates.is_empty() {
                println!("No templates stored in {}", config.templates_dir.display());
                return Ok(());
            }
            for template in templates {
                println!(
                    "{:<24} {} ({} field patterns)",
                    template.id,
                    template.title,
                    template.pattern.len()
                );
            }
        }
        TemplateCommand::Show { id } => {
            let template = store
                .get(&id)?
                .ok_or(SiftError::TemplateNotFound(id))?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        TemplateCommand::Add {
            id,
            title,
            regex,
            pages,
            language,
            override_existing,
        } => {
            store.upsert(&id, &title, &regex, pages, &language, override_existing)?;
            println!("{} Template {} stored", style("✓").green(), id);
        }
        TemplateCommand::AddPattern {
            id,
            title,
            regex,
            pages,
            multi,
            assign,
        } => {
            store.append_field_pattern(
                &id,
                FieldPattern {
                    title,
                    regex,
                    page_detection: pages,
                    multi_matches: multi,
                    capture_assignment: assign,
                },
            )?;
            println!("{} Field pattern appended to {}", style("✓").green(), id);
        }
        TemplateCommand::Delete { id } => {
            store.delete(&id)?;
            println!("{} Template {} removed", style("✓").green(), id);
        }
    }

    Ok(())
}
