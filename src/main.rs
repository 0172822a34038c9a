use clap::Parser;
use snp_refval::config::Config;
use snp_refval::corim::{Corim, DocumentSink, PROFILE};
use snp_refval::generator::{generate, Context};
use snp_refval::measure::{LaunchDigester, SevLaunchDigester};
use snp_refval::report::AttestationReport;
use snp_refval::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "snp-refval", author, version, about = "Reference Values Generator")]
enum RefValCli {
    Sevsnp(SevsnpArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Generate SEV-SNP reference values from an attestation report \
    taken on a known-good guest")]
struct SevsnpArgs {
    /// File containing info about the VM/TEE (YAML, TOML or JSON)
    #[arg(short = 'c', long)]
    vmconfig: PathBuf,

    /// OVMF used with this VM/TEE
    #[arg(short, long)]
    ovmf: PathBuf,

    /// SEV-SNP ATTESTATION_REPORT, binary LE format
    #[arg(short, long)]
    report: PathBuf,

    /// Output reference values for the VM/TEE in CoRIM format
    #[arg(short = 'f', long)]
    corim: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(RefValCli::parse())
}

fn run(cli: RefValCli) -> ExitCode {
    match cli {
        RefValCli::Sevsnp(args) => {
            let mut digester = SevLaunchDigester::new(&args.ovmf);

            match sevsnp(&args, &mut digester) {
                Ok(path) => {
                    println!("generated {}", path.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("reference values generation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn sevsnp(args: &SevsnpArgs, digester: &mut impl LaunchDigester) -> Result<PathBuf, Error> {
    let config = Config::load(&args.vmconfig)?;

    info!(config = %args.vmconfig.display(), "using config file");

    let buf = fs::read(&args.report)
        .map_err(|e| Error::ReportRead(format!("{}: {e}", args.report.display())))?;

    let report = AttestationReport::decode(&buf)?;

    info!(
        bytes = buf.len(),
        version = report.version,
        current_tcb = %report.current_tcb,
        author_key_en = report.author_key_en(),
        "report file successfully read"
    );

    let mut corim = Corim::new(PROFILE, Uuid::new_v4());

    let n = generate(&Context::new(&report, &config), digester, &mut corim)?;

    info!(id = %corim.id(), profile = corim.profile(), comids = n, "corim complete");

    let out = corim.finalize()?;

    let path = output_path(args.corim.as_ref());

    fs::write(&path, out).map_err(|e| Error::Write(format!("{}: {e}", path.display())))?;

    Ok(path)
}

fn output_path(corim: Option<&PathBuf>) -> PathBuf {
    corim
        .cloned()
        .unwrap_or_else(|| std::env::temp_dir().join(format!("corim-{}.cbor", Uuid::new_v4())))
}
