//
// main.rs
//

use std::env;

use pathsense::backend;

fn print_usage() {
    println!(
        "pathsense {}, a path completion language server.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: pathsense [OPTIONS]

Available options:

--stdio                      Start the LSP server using stdio transport
--version                    Print the version
--help                       Print this help message

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    for arg in argv {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("pathsense {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    // stdout carries the LSP transport. The logger admits debug records and
    // the global max level gates them, so the `debug` setting can raise it
    // at runtime. RUST_LOG, when set, replaces both.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_env(env_logger::Env::default())
        .target(env_logger::Target::Stderr)
        .init();
    if env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log::LevelFilter::Info);
    }

    backend::start_lsp().await
}
