use std::path::PathBuf;

use clap::Parser;

/// Order replica configuration. The replica's own id is a process argument
/// (§6); host/port for itself, its two peers, and the catalog come from the
/// environment, matching the original's `ORDER_{1,2,3}_{HOST,PORT}` names.
#[derive(Parser, Debug)]
pub struct Config {
    #[arg(long)]
    pub server_id: u8,

    #[arg(long, env = "ORDER_1_HOST")]
    pub order_1_host: String,
    #[arg(long, env = "ORDER_1_PORT")]
    pub order_1_port: u16,
    #[arg(long, env = "ORDER_2_HOST")]
    pub order_2_host: String,
    #[arg(long, env = "ORDER_2_PORT")]
    pub order_2_port: u16,
    #[arg(long, env = "ORDER_3_HOST")]
    pub order_3_host: String,
    #[arg(long, env = "ORDER_3_PORT")]
    pub order_3_port: u16,

    #[arg(long, env = "CATALOG_HOST")]
    pub catalog_host: String,
    #[arg(long, env = "CATALOG_PORT")]
    pub catalog_port: u16,

    #[arg(long)]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn own_port(&self) -> u16 {
        match self.server_id {
            1 => self.order_1_port,
            2 => self.order_2_port,
            3 => self.order_3_port,
            other => panic!("invalid server id {other}, must be 1, 2, or 3"),
        }
    }

    pub fn store_path_or_default(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("order{}_database.json", self.server_id)))
    }

    pub fn peers(&self) -> Vec<(u8, bourse_wire::Addr)> {
        [
            (1, self.order_1_host.clone(), self.order_1_port),
            (2, self.order_2_host.clone(), self.order_2_port),
            (3, self.order_3_host.clone(), self.order_3_port),
        ]
        .into_iter()
        .filter(|(id, _, _)| *id != self.server_id)
        .map(|(id, host, port)| (id, bourse_wire::Addr::new(host, port)))
        .collect()
    }
}
