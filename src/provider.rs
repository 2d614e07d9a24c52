use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::catalog_fetch::CatalogSource;
use crate::state::{Delta, ProviderCommand};

/// Runs `source` on a worker thread. Commands are handled one at a time, in the order
/// they were sent; the thread exits once every command sender is dropped.
pub fn spawn_catalog_provider<S>(
    source: S,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    S: CatalogSource + 'static,
{
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = handle_command(&source, cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
    })
}

pub fn handle_command<S: CatalogSource + ?Sized>(source: &S, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchAll => match source.fetch_all() {
            Ok(players) => Delta::SetPlayers(players),
            Err(err) => Delta::FetchFailed(err),
        },
        ProviderCommand::FetchPlayer { id } => match source.fetch_player(&id) {
            Ok(player) => Delta::SetPlayerDetail { id, player },
            Err(error) => Delta::PlayerDetailFailed { id, error },
        },
    }
}
