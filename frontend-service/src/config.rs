use clap::Parser;

/// Front-end process configuration. Host/port for itself, the catalog, and
/// all three order replicas come from the environment (matching the
/// original's `.env` file); cache-mode is a process argument, as §6
/// specifies, and the LRU capacity is the nominal test value from §3
/// unless overridden.
#[derive(Parser, Debug)]
pub struct Config {
    #[arg(long, env = "FRONT_PORT")]
    pub front_port: u16,

    #[arg(long, env = "CATALOG_HOST")]
    pub catalog_host: String,
    #[arg(long, env = "CATALOG_PORT")]
    pub catalog_port: u16,

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

    /// Whether lookups are cached and invalidation notifications accepted.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub cache_mode: bool,

    #[arg(long, default_value_t = 3)]
    pub cache_capacity: usize,
}

impl Config {
    pub fn replicas(&self) -> Vec<(u8, bourse_wire::Addr)> {
        vec![
            (1, bourse_wire::Addr::new(self.order_1_host.clone(), self.order_1_port)),
            (2, bourse_wire::Addr::new(self.order_2_host.clone(), self.order_2_port)),
            (3, bourse_wire::Addr::new(self.order_3_host.clone(), self.order_3_port)),
        ]
    }
}
