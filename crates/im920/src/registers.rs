//! Typed accessors for the module's configuration registers.
//!
//! Settings changed with `persist = false` last until the module resets.
//! With `persist = true`, and for every change to the receiver ID table, the
//! write is bracketed by `ENWR`/`DSWR` so it lands in non-volatile memory.

use im920_protocol::{Channel, CommMode, Command, Id, Rssi};
use tracing::{debug, warn};

use crate::driver::Im920;
use crate::error::{Error, Result};
use crate::transport::Transport;

impl<T: Transport> Im920<T> {
    /// Send a typed command that must be answered with `OK\r\n`.
    fn issue_normal(&self, command: &Command) -> Result<()> {
        self.issue_command_normal(command.mnemonic(), &command.parameter())
    }

    /// Send a typed command whose reply is one hex number.
    fn issue_num(&self, command: &Command) -> Result<u16> {
        self.issue_command_resp_num(command.mnemonic(), &command.parameter())
    }

    /// Run `f` with non-volatile writes enabled.
    ///
    /// `DSWR` is sent even when `f` fails; the first error wins.
    pub fn with_write_enabled<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        self.issue_normal(&Command::EnableWrite)?;
        let result = f(self);
        let disabled = self.issue_normal(&Command::DisableWrite);

        match (result, disabled) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(disable_err)) => {
                warn!(
                    "Im920[{}]: DSWR failed after an earlier error: {}",
                    self.name(),
                    disable_err
                );
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
        }
    }

    fn maybe_persist(&self, command: &Command, persist: bool) -> Result<()> {
        if persist {
            self.with_write_enabled(|im| im.issue_normal(command))
        } else {
            self.issue_normal(command)
        }
    }

    /// Read this module's ID.
    pub fn id(&self) -> Result<Id> {
        Ok(Id(self.issue_num(&Command::ReadId)?))
    }

    /// Read the firmware version string.
    pub fn version(&self) -> Result<String> {
        let command = Command::ReadVersion;
        self.issue_command_resp_str(command.mnemonic(), &command.parameter())
    }

    /// Read the radio channel.
    pub fn channel(&self) -> Result<Channel> {
        let value = self.issue_num(&Command::ReadChannel)?;
        let channel = u8::try_from(value).map_err(|_| out_of_range("channel", value))?;
        Ok(Channel(channel))
    }

    /// Set the radio channel.
    pub fn set_channel(&self, channel: Channel, persist: bool) -> Result<()> {
        debug!("Im920[{}]: set channel {} (persist: {})", self.name(), channel, persist);
        self.maybe_persist(&Command::SetChannel { channel }, persist)
    }

    /// Read the RF communication mode.
    pub fn comm_mode(&self) -> Result<CommMode> {
        let value = self.issue_num(&Command::ReadCommMode)?;
        Ok(CommMode::try_from(value)?)
    }

    /// Set the RF communication mode.
    pub fn set_comm_mode(&self, mode: CommMode, persist: bool) -> Result<()> {
        debug!("Im920[{}]: set comm mode {:?} (persist: {})", self.name(), mode, persist);
        self.maybe_persist(&Command::SetCommMode { mode }, persist)
    }

    /// Read the current signal strength.
    pub fn rssi(&self) -> Result<Rssi> {
        let value = self.issue_num(&Command::ReadRssi)?;
        let rssi = u8::try_from(value).map_err(|_| out_of_range("rssi", value))?;
        Ok(Rssi(rssi))
    }

    /// Accept frames from the module with the given ID.
    pub fn add_receiver_id(&self, id: Id) -> Result<()> {
        debug!("Im920[{}]: store receiver id {}", self.name(), id);
        self.with_write_enabled(|im| im.issue_normal(&Command::StoreReceiverId { id }))
    }

    /// Read every stored receiver ID.
    pub fn receiver_ids(&self) -> Result<Vec<Id>> {
        let command = Command::ReadReceiverIds;
        let values = self.issue_command_resp_nums(command.mnemonic(), &command.parameter())?;
        Ok(values.into_iter().map(Id).collect())
    }

    /// Erase the whole receiver ID table.
    pub fn delete_all_receiver_ids(&self) -> Result<()> {
        debug!("Im920[{}]: erase receiver ids", self.name());
        self.with_write_enabled(|im| im.issue_normal(&Command::EraseReceiverIds))
    }
}

fn out_of_range(register: &str, value: u16) -> Error {
    Error::UnexpectedResponse(format!("{} {:04X} out of range", register, value).into_bytes())
}
