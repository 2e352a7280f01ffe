use std::io::Write;

use anyhow::Result;
use chrono::Local;
use servis::core::{ChangeFeed, EditOutcome};
use servis::{AppContext, RecordKind, ServisError};
use tokio::io::AsyncBufRead;
use tracing::{debug, error, info, warn};

use crate::command::{Command, HELP, ServiceCommand};
use crate::prompt::ConsoleIo;
use crate::render::{render_service_form, render_table, render_vehicle_details};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Console session: one loop over typed commands and remote change batches
pub struct ConsoleApp<R, W> {
    app: AppContext,
    io: ConsoleIo<R, W>,
}

impl<R, W> ConsoleApp<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(app: AppContext, io: ConsoleIo<R, W>) -> Self {
        Self { app, io }
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn io(&self) -> &ConsoleIo<R, W> {
        &self.io
    }

    /// Run until `quit` or end of input.
    ///
    /// Queued remote batches are applied before the next command is read.
    /// Errors of single commands or batches are reported and the loop goes on.
    pub async fn run(&mut self, mut feed: ChangeFeed) -> Result<()> {
        self.io
            .print(&format!("StefanPOS, font {}. Type `help` for commands.", self.app.settings().settings().font_size))?;
        loop {
            tokio::select! {
                biased;
                Some((kind, batch)) = feed.next(), if !feed.is_closed() => {
                    if let Err(e) = self.app.apply_remote(kind, batch) {
                        error!("[ConsoleApp] Applying {} changes failed: {}", kind, e);
                        self.io.print(&format!("Greška ({}): {}", kind, e))?;
                    }
                }
                line = self.io.next_line() => {
                    let Some(line) = line? else {
                        info!("[ConsoleApp] End of input");
                        break;
                    };
                    match Command::parse(&line) {
                        Ok(None) => {}
                        Ok(Some(command)) => {
                            debug!("[ConsoleApp] {:?}", command);
                            match self.execute(command).await {
                                Ok(Flow::Quit) => break,
                                Ok(Flow::Continue) => {}
                                Err(e) => self.report(e)?,
                            }
                        }
                        Err(e) => self.io.print(&e.to_string())?,
                    }
                }
            }
        }
        Ok(())
    }

    fn report(&mut self, e: anyhow::Error) -> Result<()> {
        match e.downcast_ref::<ServisError>() {
            Some(servis_error) if servis_error.is_warning() => {
                warn!("[ConsoleApp] {}", servis_error);
                self.io.print(&format!("Upozorenje: {}", servis_error))?;
            }
            _ => {
                error!("[ConsoleApp] Command failed: {:#}", e);
                self.io.print(&format!("Greška: {:#}", e))?;
            }
        }
        Ok(())
    }

    fn show(&mut self, kind: RecordKind) -> Result<()> {
        let text = render_table(self.app.table(kind));
        self.io.print(&text)?;
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Help => self.io.print(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Show(None) => {
                for kind in RecordKind::ALL {
                    self.show(kind)?;
                }
            }
            Command::Show(Some(kind)) => self.show(kind)?,
            Command::Search(text) => {
                self.app.filter_customers(&text);
                self.show(RecordKind::Customers)?;
            }
            Command::Select { kind, row } => self.select(kind, row).await?,
            Command::Add(kind) => {
                let mut form = self.app.open_entry_form(kind)?;
                if self.io.fill_entry_form(&mut form).await? {
                    let id = self.app.submit_entry(&form).await?;
                    self.io.print(&format!("Dodato ({})", id))?;
                }
            }
            Command::Delete(kind) => {
                if self.app.selection().get(kind).is_none() {
                    self.io.print("Nijedan red nije odabran.")?;
                } else if self.app.delete_selected(kind, &mut self.io).await? {
                    self.io.print("Obrisano.")?;
                }
            }
            Command::Edit {
                kind,
                row,
                column,
                text,
            } => {
                let outcome = self
                    .app
                    .edit_cell(kind, row, column, text, &mut self.io)
                    .await?;
                let message = match outcome {
                    EditOutcome::Written { field } => format!("Sačuvano ({}).", field),
                    EditOutcome::Declined => "Izmena nije sačuvana.".to_string(),
                    EditOutcome::Unmapped => "Kolona se ne čuva u bazi.".to_string(),
                };
                self.io.print(&message)?;
            }
            Command::Service(service) => self.service(service).await?,
            Command::Font(size) => {
                self.app.change_font_size(size)?;
                self.io.print(&format!("Font: {}", size))?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn select(&mut self, kind: RecordKind, row: Option<usize>) -> Result<()> {
        match kind {
            RecordKind::Customers => self.app.select_customer(row)?,
            RecordKind::Vehicles => {
                let details = self
                    .app
                    .select_vehicle(row)
                    .await?
                    .map(render_vehicle_details);
                if let Some(details) = details {
                    self.io.print(&details)?;
                }
                self.show(RecordKind::Services)?;
            }
            RecordKind::Services => {
                self.app.select_service(row).await?;
                let form = render_service_form(self.app.service_form());
                self.io.print(&form)?;
            }
        }
        Ok(())
    }

    async fn service(&mut self, command: ServiceCommand) -> Result<()> {
        let form = self.app.service_form_mut();
        match command {
            ServiceCommand::Show => {}
            ServiceCommand::Details(text) => form.details = text,
            ServiceCommand::Mileage(text) => form.mileage = text,
            ServiceCommand::Price(text) => form.price = text,
            ServiceCommand::Date(date) => form.date = date,
            ServiceCommand::Time(time) => form.time = time,
            ServiceCommand::Clear => form.clear(Local::now().naive_local()),
            ServiceCommand::Add => {
                let id = self.app.add_service().await?;
                self.io.print(&format!("Servis dodat ({})", id))?;
            }
            ServiceCommand::Update => {
                if self.app.update_service(&mut self.io).await? {
                    self.io.print("Servis ažuriran.")?;
                }
            }
        }
        let text = render_service_form(self.app.service_form());
        self.io.print(&text)?;
        Ok(())
    }
}
