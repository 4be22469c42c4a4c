//! Status Tray - Main Entry Point
//!
//! Runs one status icon: left click runs a background job (busy icon while it
//! runs), right click opens the context menu. The icon and menu always follow
//! the paused and job-running flags owned by the main loop.

#![cfg_attr(windows, windows_subsystem = "windows")]

#[cfg(windows)]
mod app {
    use log::{debug, error, info, warn};
    use status_tray::error::Result;
    use status_tray::logging::{init_logging, LoggingConfig};
    use status_tray::settings::{AppConfig, ConfigManager};
    use status_tray::tray::{
        ContextMenu, IconSet, IconState, MenuItemId, NativeTrayHost, StatusIconController,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;
    use windows::Win32::Foundation::{BOOL, HWND};
    use windows::Win32::System::Console::{
        SetConsoleCtrlHandler, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
    };

    const MENU_STATUS: u32 = 1;
    const MENU_RUN_JOB: u32 = 2;
    const MENU_TOGGLE_PAUSE: u32 = 3;
    const MENU_EXIT: u32 = 4;

    /// Simulated background job length
    const JOB_DURATION: Duration = Duration::from_secs(3);

    /// Global shutdown flag for Ctrl+C handling
    static SHUTDOWN_FLAG: AtomicBool = AtomicBool::new(false);

    unsafe extern "system" fn console_ctrl_handler(ctrl_type: u32) -> BOOL {
        match ctrl_type {
            x if x == CTRL_C_EVENT || x == CTRL_BREAK_EVENT || x == CTRL_CLOSE_EVENT => {
                info!("Received shutdown signal (type: {})", ctrl_type);
                SHUTDOWN_FLAG.store(true, Ordering::SeqCst);
                BOOL::from(true)
            }
            _ => BOOL::from(false),
        }
    }

    /// Requests raised by tray handlers and job workers, handled by the main loop
    #[derive(Debug, Clone, Copy)]
    enum AppCommand {
        RunJob,
        JobFinished,
        TogglePause,
        Exit,
    }

    struct App {
        controller: StatusIconController<NativeTrayHost>,
        commands: Receiver<AppCommand>,
        tx: Sender<AppCommand>,
        icons: IconSet,
        poll_interval: Duration,
        job_running: bool,
        paused: bool,
        running: bool,
    }

    impl App {
        fn new(config: &AppConfig) -> Result<Self> {
            let (tx, commands) = mpsc::channel();
            let host = NativeTrayHost::new(config.tray.tooltip(), config.tray.menu_on_left_click);

            let action_tx = tx.clone();
            let item_tx = tx.clone();

            let controller = StatusIconController::initialize(
                host,
                config.icons.path_for(IconState::Idle),
                move || {
                    let _ = action_tx.send(AppCommand::RunJob);
                },
                // The native menu is already on screen; it is rebuilt on state changes instead
                || debug!("Context menu requested"),
            )?
            .with_menu_item_handler(move |id: MenuItemId| {
                let command = match id.0 {
                    MENU_RUN_JOB => AppCommand::RunJob,
                    MENU_TOGGLE_PAUSE => AppCommand::TogglePause,
                    MENU_EXIT => AppCommand::Exit,
                    _ => return,
                };
                let _ = item_tx.send(command);
            })
            .with_handler_budget(Duration::from_millis(config.tray.handler_budget_ms as u64));

            let mut app = Self {
                controller,
                commands,
                tx,
                icons: config.icons.clone(),
                poll_interval: Duration::from_millis(config.tray.poll_interval_ms as u64),
                job_running: false,
                paused: false,
                running: true,
            };
            app.refresh_menu()?;
            Ok(app)
        }

        fn icon_state(&self) -> IconState {
            IconState::for_status(self.paused, self.job_running)
        }

        fn build_menu(&self) -> ContextMenu {
            let status = match self.icon_state() {
                IconState::Disabled => "Status: paused",
                IconState::Busy => "Status: busy",
                IconState::Idle => "Status: idle",
            };

            ContextMenu::new()
                .disabled_item(MENU_STATUS, status)
                .separator()
                .item(MENU_RUN_JOB, "Run Job")
                .item(MENU_TOGGLE_PAUSE, if self.paused { "Resume" } else { "Pause" })
                .separator()
                .item(MENU_EXIT, "Exit")
        }

        fn refresh_menu(&mut self) -> Result<()> {
            let menu = self.build_menu();
            self.controller.set_context_menu(menu)
        }

        /// Show the icon and menu for the current `(paused, job_running)` pair
        fn state_changed(&mut self) {
            let state = self.icon_state();
            if let Err(e) = self.controller.update_icon(self.icons.path_for(state)) {
                warn!("Icon for {} not applied: {}", state, e);
            }
            if let Err(e) = self.refresh_menu() {
                warn!("Menu not refreshed: {}", e);
            }
        }

        /// Hand the job to a worker thread; it reports back with `JobFinished`
        fn start_job(&mut self) -> Result<()> {
            if self.paused {
                info!("Paused, ignoring job request");
                return Ok(());
            }
            if self.job_running {
                info!("Job already running");
                return Ok(());
            }

            self.job_running = true;
            let tx = self.tx.clone();
            std::thread::spawn(move || {
                std::thread::sleep(JOB_DURATION);
                if tx.send(AppCommand::JobFinished).is_err() {
                    warn!("Job finished after the main loop stopped");
                }
            });
            info!("Job started");
            self.state_changed();
            Ok(())
        }

        fn finish_job(&mut self) -> Result<()> {
            self.job_running = false;
            info!("Job finished");
            self.state_changed();
            Ok(())
        }

        fn toggle_pause(&mut self) -> Result<()> {
            self.paused = !self.paused;
            info!("{}", if self.paused { "Paused" } else { "Resumed" });
            self.state_changed();
            Ok(())
        }

        fn handle_command(&mut self, command: AppCommand) -> Result<()> {
            match command {
                AppCommand::RunJob => self.start_job(),
                AppCommand::JobFinished => self.finish_job(),
                AppCommand::TogglePause => self.toggle_pause(),
                AppCommand::Exit => {
                    info!("Exit requested");
                    self.running = false;
                    Ok(())
                }
            }
        }

        fn run(&mut self) -> Result<()> {
            info!("Starting main event loop");
            let mut msg = MSG::default();

            while self.running && !SHUTDOWN_FLAG.load(Ordering::SeqCst) {
                unsafe {
                    while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                        let _ = TranslateMessage(&msg);
                        let _ = DispatchMessageW(&msg);
                    }
                }

                if let Err(e) = self.controller.process_events() {
                    error!("Tray event error: {}", e);
                }

                while let Ok(command) = self.commands.try_recv() {
                    if let Err(e) = self.handle_command(command) {
                        error!("Command {:?} failed: {}", command, e);
                    }
                }

                std::thread::sleep(self.poll_interval);
            }
            Ok(())
        }

        fn shutdown(&mut self) {
            info!("Shutting down");
            self.controller.teardown();
        }
    }

    pub fn main() {
        let config_manager = match ConfigManager::new() {
            Ok(cm) => cm,
            Err(e) => {
                eprintln!("Failed to initialize config manager: {}", e);
                return;
            }
        };

        let config = config_manager.load().unwrap_or_else(|e| {
            eprintln!("Failed to load config: {}, using defaults", e);
            AppConfig::default()
        });

        let log_config = LoggingConfig::from_settings(&config.logging, config_manager.log_dir());
        if let Err(e) = init_logging(&log_config) {
            eprintln!("Failed to initialize logging: {}", e);
        }

        unsafe {
            if let Err(e) = SetConsoleCtrlHandler(Some(console_ctrl_handler), true) {
                warn!("Failed to set console control handler: {:?}", e);
            }
        }

        info!("Status Tray starting...");
        info!("Version: {}", env!("CARGO_PKG_VERSION"));

        let mut app = match App::new(&config) {
            Ok(app) => app,
            Err(e) => {
                // Running without a tray icon is the only option left
                warn!("Tray icon unavailable ({:?}): {}", e.severity(), e);
                return;
            }
        };

        if let Err(e) = app.run() {
            error!("Application error: {}", e);
        }
        app.shutdown();

        info!("Status Tray stopped");
    }
}

#[cfg(windows)]
fn main() {
    app::main();
}

#[cfg(not(windows))]
fn main() {
    eprintln!("status_tray: the tray loop is only supported on Windows");
    std::process::exit(1);
}
