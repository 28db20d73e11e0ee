use kagglehelper::Client;

fn main() {
    // Example program that calls the library API.
    // Needs the `kaggle` tool on PATH and ~/.kaggle/kaggle.json.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = match Client::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match client.browse("titanic", false) {
        Ok(table) => println!("{}", table),
        Err(e) => eprintln!("{}", e),
    }

    match client.download("heptapod/titanic", Some("titanic-data")) {
        Ok(location) => println!("{}", location),
        Err(e) => eprintln!("{}", e),
    }
}
