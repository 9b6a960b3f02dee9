use clap::Parser;
use email_verifier::{dns::DnsResolver, verification::verify_email};

#[derive(Parser)]
#[command(about = "Check an email address's format and its domain's MX, SPF and DMARC records")]
struct Cli {
    /// Address to verify
    email: String,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let resolver = DnsResolver::new()?;
    let result = verify_email(&cli.email, &resolver).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Verification for: {}", cli.email);
        println!("  Valid: {}", result.valid);
        if !result.reason.is_empty() {
            println!("  Reason: {}", result.reason);
        }
        println!("  MX: {}", result.has_mx);
        println!(
            "  SPF record: {}",
            if result.has_spf { result.spf_record.as_str() } else { "None" }
        );
        println!(
            "  DMARC record: {}",
            if result.has_dmarc { result.dmarc_record.as_str() } else { "None" }
        );
    }

    Ok(())
}
