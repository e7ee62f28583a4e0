use ordinals::types::BitcoinNetwork;

pub fn generate_config(network: &BitcoinNetwork) -> String {
    let conf = format!(
        r#"[storage]
working_dir = "ordinals"

[network]
mode = "{network}"
# Inscriptions revealed from this height on are numbered with
# their jubilee number. Defaults to the network activation height.
# jubilee_height = 824544

[query]
default_page_limit = 20
max_page_limit = 60

[resources]
ingestion_queue_size = 8

[logs]
ingestion_internals = true
"#,
        network = network,
    );
    conf
}
