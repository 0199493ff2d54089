//! Dashboard commands.

use anyhow::Result;
use clap::ValueEnum;
use pushdeck_core::Environment;

use super::{Client, print};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Bucket {
    Queued,
    Inprogress,
    Deployed,
}

impl Bucket {
    fn as_str(self) -> &'static str {
        match self {
            Bucket::Queued => "queued",
            Bucket::Inprogress => "inprogress",
            Bucket::Deployed => "deployed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoardArgs {
    pub env: Option<Environment>,
    pub bucket: Option<Bucket>,
    pub repo: Option<String>,
    pub page_size: Option<i64>,
}

impl BoardArgs {
    fn path(&self) -> String {
        match (self.env, self.bucket) {
            (Some(env), Some(bucket)) => format!("api/v1/board/{}/{}", env, bucket.as_str()),
            _ => "api/v1/board".to_string(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(repo) = &self.repo {
            query.push(("repo", repo.clone()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.to_string()));
        }
        query
    }
}

pub async fn show(client: &Client, args: &BoardArgs) -> Result<()> {
    let board = client.get(&args.path(), &args.query()).await?;
    print(&board)
}

pub async fn deploying(client: &Client) -> Result<()> {
    let summary = client.get("api/v1/board/deploying", &[]).await?;
    print(&summary)
}
