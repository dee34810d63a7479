use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, path::PathBuf, str::FromStr};

/// Default upload cap, 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which backend receives uploaded objects.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectBackend {
    /// Objects are written under a local directory, one folder per bucket.
    Local,
    /// Objects are written through the S3 API.
    S3,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub pictures_bucket: String,
    pub thumbnails_bucket: String,
    pub storage_host: String,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub database_url: String,
    pub object_backend: ObjectBackend,
    pub object_store_dir: PathBuf,
    pub s3_endpoint_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Picture upload and gallery frontend")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket receiving uploaded pictures (overrides BUCKET_PICTURES)
    #[arg(long)]
    pub pictures_bucket: Option<String>,

    /// Bucket holding thumbnails and the collage (overrides BUCKET_THUMBNAILS)
    #[arg(long)]
    pub thumbnails_bucket: Option<String>,

    /// Public storage host, URLs look like https://storage.<host>/<bucket>/<name> (overrides STORAGE_HOST)
    #[arg(long)]
    pub storage_host: Option<String>,

    /// Directory of static assets served for non-API paths (overrides STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Directory receiving temporary upload copies (overrides UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Maximum accepted request body size in bytes (overrides MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Metadata database URL (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Object store backend (overrides OBJECT_STORE_BACKEND)
    #[arg(long = "object-store", value_enum)]
    pub object_backend: Option<ObjectBackend>,

    /// Root directory of the local object store (overrides OBJECT_STORE_DIR)
    #[arg(long)]
    pub object_store_dir: Option<PathBuf>,

    /// Custom S3 endpoint, e.g. https://storage.googleapis.com (overrides S3_ENDPOINT_URL)
    #[arg(long)]
    pub s3_endpoint_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |key| env::var(key).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI arguments over values looked up by `lookup`, then defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_port = parse_var(&lookup, "PORT")?.unwrap_or(8080);
        let env_max_upload =
            parse_var(&lookup, "MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let env_backend = match lookup("OBJECT_STORE_BACKEND") {
            Some(value) => <ObjectBackend as ValueEnum>::from_str(&value, true).map_err(|err| {
                anyhow::anyhow!("parsing OBJECT_STORE_BACKEND value `{}`: {}", value, err)
            })?,
            None => ObjectBackend::Local,
        };

        let Some(pictures_bucket) = args
            .pictures_bucket
            .or_else(|| lookup("BUCKET_PICTURES"))
        else {
            bail!("BUCKET_PICTURES is not set");
        };
        let Some(thumbnails_bucket) = args
            .thumbnails_bucket
            .or_else(|| lookup("BUCKET_THUMBNAILS"))
        else {
            bail!("BUCKET_THUMBNAILS is not set");
        };

        Ok(Self {
            host: args
                .host
                .or_else(|| lookup("HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.unwrap_or(env_port),
            pictures_bucket,
            thumbnails_bucket,
            storage_host: args
                .storage_host
                .or_else(|| lookup("STORAGE_HOST"))
                .unwrap_or_else(|| "cloud.google.com".into()),
            static_dir: args
                .static_dir
                .or_else(|| lookup("STATIC_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("public")),
            upload_dir: args
                .upload_dir
                .or_else(|| lookup("UPLOAD_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("/tmp")),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            database_url: args
                .database_url
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or_else(|| "sqlite://./data/pictures.db".into()),
            object_backend: args.object_backend.unwrap_or(env_backend),
            object_store_dir: args
                .object_store_dir
                .or_else(|| lookup("OBJECT_STORE_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("./data/objects")),
            s3_endpoint_url: args.s3_endpoint_url.or_else(|| lookup("S3_ENDPOINT_URL")),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(None),
    }
}
