use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use log::{debug, error, info};
use url::Url;

use crate::rest::handover::{summarise, HandoverClient, HandoverSpec};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum HandoverAction {
    Submit,
    Retrieve,
    List,
    Delete,
    Summary,
}

/// Hand over a database via the handover REST service.
#[derive(Args, Debug)]
pub struct HandoverArgs {
    /// Handover REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: HandoverAction,

    /// URI of database to hand over
    #[arg(short = 's', long)]
    src_uri: Option<String>,

    /// Email address
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Description
    #[arg(short = 'c', long)]
    description: Option<String>,

    /// Handover token
    #[arg(short = 't', long)]
    handover_token: Option<String>,
}

pub async fn run(args: &HandoverArgs) -> Result<()> {
    let client = HandoverClient::new(&args.uri)?;
    match args.action {
        HandoverAction::Submit => {
            let src_uri = args.src_uri.as_ref().context("--src_uri is required to submit")?;
            let email = args.email.as_ref().context("--email is required to submit")?;
            let description =
                args.description.as_ref().context("--description is required to submit")?;
            assert_mysql_db_uri(src_uri)?;
            assert_email(email)?;

            let spec = HandoverSpec {
                src_uri: src_uri.clone(),
                contact: email.clone(),
                comment: description.clone(),
            };
            debug!("{spec:?}");
            let token = client.submit_handover(&spec).await?;
            info!("Job submitted with transaction ID {token}");
            Ok(())
        }
        HandoverAction::Retrieve => {
            let token =
                args.handover_token.as_ref().context("--handover_token is required to retrieve")?;
            let records = client.retrieve_handover(token).await?;
            let Some(latest) = records.first() else {
                bail!("No handover found for token {token}");
            };
            if let Err(err) = client.print_handover(latest) {
                error!("{err}");
            }
            Ok(())
        }
        HandoverAction::List => {
            for handover in client.list_handovers().await? {
                if let Err(err) = client.print_handover(&handover) {
                    error!("{err}");
                }
            }
            Ok(())
        }
        HandoverAction::Delete => {
            let token =
                args.handover_token.as_ref().context("--handover_token is required to delete")?;
            client.delete_handover(token).await?;
            info!("Handover {token} was successfully deleted");
            Ok(())
        }
        HandoverAction::Summary => {
            let handovers = client.list_handovers().await?;
            let summary = summarise(&handovers);
            let contact = args.email.as_deref();
            for (handover_contact, messages) in &summary {
                if contact.is_some_and(|c| c != handover_contact.as_str()) {
                    continue;
                }
                info!("Handovers by {handover_contact}:");
                for (message, count) in messages {
                    info!("  {count} x {message}");
                }
            }
            Ok(())
        }
    }
}

/// The handover source must be a MySQL URI naming one database.
fn assert_mysql_db_uri(uri: &str) -> Result<()> {
    let url = Url::parse(uri).with_context(|| format!("Invalid database URI: {uri}"))?;
    if url.scheme() != "mysql" {
        bail!("Handover source must be a mysql:// URI, got: {uri}");
    }
    if url.path().trim_matches('/').is_empty() {
        bail!("Handover source URI must name a database: {uri}");
    }
    Ok(())
}

fn assert_email(email: &str) -> Result<()> {
    let valid = matches!(email.split_once('@'), Some((user, domain))
        if !user.is_empty() && domain.contains('.'));
    if !valid {
        bail!("Invalid email address: {email}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handover_source_must_be_a_mysql_db_uri() {
        assert!(assert_mysql_db_uri("mysql://user@host:3306/homo_sapiens_core_110_38").is_ok());
        assert!(assert_mysql_db_uri("mysql://user@host:3306/").is_err());
        assert!(assert_mysql_db_uri("https://host/db").is_err());
        assert!(assert_mysql_db_uri("not a uri").is_err());
    }

    #[test]
    fn email_sanity_check() {
        assert!(assert_email("someone@ebi.ac.uk").is_ok());
        assert!(assert_email("@ebi.ac.uk").is_err());
        assert!(assert_email("someone").is_err());
        assert!(assert_email("someone@nodomain").is_err());
    }
}
