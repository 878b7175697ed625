//! vmware-avi-connector - NSX-ALB certificate discovery connector

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    avi_connector::run().await
}
