use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::info;
use tree_console::{
    logging, ConsoleSurface, EnvConfig, ProcessTerminal, SessionContext, Shell, ShellOptions,
    SurfaceGuard,
};

mod commands;
mod layout_options;

use commands::{OptionsCommand, SetCommand};

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    logging::init(&config);

    let session = SessionContext::new()
        .with_tree_collection("trees")
        .with_window("main")
        .with_instance_state("main-state");
    let controls = layout_options::compile(&session).map_err(io::Error::other)?;
    let controls = Rc::new(RefCell::new(controls));

    let mut shell = Shell::with_builtins(ShellOptions::from_config(&config))
        .map_err(io::Error::other)?;
    shell
        .register(Box::new(OptionsCommand::new(Rc::clone(&controls))))
        .map_err(io::Error::other)?;
    shell
        .register(Box::new(SetCommand::new(controls)))
        .map_err(io::Error::other)?;

    let mut guard = SurfaceGuard::start(ProcessTerminal::new(&config))?;
    let terminal = guard.surface_mut();
    info!(
        interactive = terminal.is_interactive(),
        columns = terminal.columns(),
        "tree console started"
    );
    shell.run(terminal)
}
