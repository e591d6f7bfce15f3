//! Top-level dispatch for every shell event.

use crate::{
    APP_SCHEME, ApplicationSession, BuildMode, DeepLinkPayload, Desktop, EventSink, Flow,
    InstanceLock, InstanceRole, IpcMessage, LaunchArgs, LifecycleState, ServerEvent, ServerFault,
    ServerHooks, ServerLauncher, ServerSlot, ShellEvent, ShellWindow, StatusIconRegistry,
    StatusTray, TrayAction, UpdateOrchestrator, UpdateService, UpdateTrigger,
    WindowLifecycleManager, WindowPreferences, classify, fatal, origin_policy,
};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::runtime::Handle;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Notice shown when the server port is held by someone else.
pub const ALREADY_RUNNING_NOTICE: &str = "Stethoscope is already running";

/// How this process was launched.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    /// Full argv, executable first.
    pub argv: Vec<String>,
    /// Working directory at launch.
    pub cwd: PathBuf,
    /// Build mode.
    pub build_mode: BuildMode,
    /// URL the main window loads.
    pub content_url: Url,
}

/// External collaborators the controller orchestrates.
pub struct Collaborators<I> {
    /// Tray icons, loaded before the controller exists.
    pub icons: StatusIconRegistry<I>,
    /// Single-instance guard.
    pub instance_lock: Box<dyn InstanceLock>,
    /// Background server starter.
    pub server_launcher: Box<dyn ServerLauncher>,
    /// External updater.
    pub update_service: Arc<dyn UpdateService>,
    /// Runtime for update attempts.
    pub runtime: Handle,
    /// Event loop entry point handed to the server.
    pub sink: Arc<dyn EventSink>,
}

/// Owns the [`ApplicationSession`] and routes every [`ShellEvent`] to it.
///
/// Handlers never let component errors escape. Only startup-fatal
/// conditions and uncaught failures end the process.
pub struct AppLifecycleController<W, T: StatusTray> {
    session: ApplicationSession<W, T>,
    windows: WindowLifecycleManager<T::Image>,
    launch: LaunchContext,
    launch_args: LaunchArgs,
    instance_lock: Box<dyn InstanceLock>,
    server_launcher: Box<dyn ServerLauncher>,
    update_service: Arc<dyn UpdateService>,
    updater: Option<UpdateOrchestrator>,
    runtime: Handle,
    sink: Arc<dyn EventSink>,
}

impl<W: ShellWindow, T: StatusTray> AppLifecycleController<W, T> {
    /// Controller for a process launched as described by `launch`.
    pub fn new(launch: LaunchContext, collaborators: Collaborators<T::Image>) -> Self {
        let launch_args = LaunchArgs::parse(launch.argv.iter().cloned());
        let prefs = WindowPreferences::new(launch.build_mode, launch_args.enable_debugger);
        let windows = WindowLifecycleManager::new(
            prefs,
            launch.build_mode,
            launch.content_url.clone(),
            collaborators.icons,
        );

        Self {
            session: ApplicationSession::new(ServerSlot::default()),
            windows,
            launch,
            launch_args,
            instance_lock: collaborators.instance_lock,
            server_launcher: collaborators.server_launcher,
            update_service: collaborators.update_service,
            updater: None,
            runtime: collaborators.runtime,
            sink: collaborators.sink,
        }
    }

    /// Session state, for inspection.
    pub fn session(&self) -> &ApplicationSession<W, T> {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut ApplicationSession<W, T> {
        &mut self.session
    }

    /// Handle on the server slot for the crash path.
    pub fn server_slot(&self) -> ServerSlot {
        self.session.server.clone()
    }

    /// Process one event.
    pub fn dispatch<D>(&mut self, desktop: &mut D, event: ShellEvent) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        if self.session.state == LifecycleState::Quitting
            && !matches!(event, ShellEvent::BeforeQuit | ShellEvent::UncaughtError(_))
        {
            debug!(event = ?event, "Ignoring event while quitting");
            return Flow::Continue;
        }

        match event {
            ShellEvent::Ready => self.on_ready(desktop),
            ShellEvent::Activate => self.on_activate(desktop),
            ShellEvent::OpenUrl(url) => self.on_open_url(&url),
            ShellEvent::SecondInstance { args, cwd } => {
                self.on_second_instance(desktop, &args, &cwd)
            }
            ShellEvent::Ipc(message) => self.on_ipc(desktop, message),
            ShellEvent::Server(event) => self.on_server_event(desktop, event),
            ShellEvent::TrayClicked => {
                self.windows.on_tray_clicked(&mut self.session, desktop);
                Flow::Continue
            }
            ShellEvent::TrayMenu(action) => self.on_tray_menu(desktop, action),
            ShellEvent::MainWindowClosed => self.on_main_window_closed(desktop),
            ShellEvent::QuitRequested => self.quit(),
            ShellEvent::BeforeQuit => {
                self.before_quit();
                Flow::Quit
            }
            ShellEvent::UncaughtError(message) => self.on_uncaught_error(&message),
        }
    }

    #[instrument(skip_all)]
    fn on_ready<D>(&mut self, desktop: &mut D) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        if self.session.state != LifecycleState::Starting {
            warn!(state = ?self.session.state, "Ready delivered twice, ignoring");
            return Flow::Continue;
        }
        self.session.state = LifecycleState::Ready;

        // An open-url that arrived before the window existed.
        let early_intent = self.session.pending_deep_link.take();

        match self
            .instance_lock
            .acquire(&self.launch.argv, &self.launch.cwd)
        {
            Ok(InstanceRole::Primary) => {}
            Ok(InstanceRole::Secondary) => {
                info!("Handed launch to the running instance, quitting");
                return self.quit();
            }
            Err(e) => {
                error!(error = %e, "Failed to acquire single instance lock");
                return self.exit_fatal();
            }
        }

        self.updater = Some(UpdateOrchestrator::new(
            Arc::clone(&self.update_service),
            self.runtime.clone(),
        ));

        // Before the first window, so its initial load already goes out rewritten.
        desktop.install_request_headers_hook(origin_policy::request_headers_hook());

        if let Err(e) = self.open_main_window(desktop) {
            error!(error = %e, "Failed to create main window");
            return self.exit_fatal();
        }

        if desktop.platform().args_carry_deep_link() {
            let intent = classify(&self.launch_args.payload);
            self.session.pending_deep_link.remember(intent);
        }

        if let Err(e) = desktop.register_protocol(APP_SCHEME) {
            warn!(error = %e, scheme = APP_SCHEME, "Failed to register protocol handler");
        }

        self.start_server();

        if early_intent.is_update() {
            info!("Launching into updater");
            self.trigger_update(UpdateTrigger::LaunchDeepLink);
        }

        self.session.state = LifecycleState::Active;
        Flow::Continue
    }

    /// Window, first-launch check and tray.
    fn open_main_window<D>(&mut self, desktop: &mut D) -> crate::CoreResult<()>
    where
        D: Desktop<Window = W, Tray = T>,
    {
        self.windows.create_main_window(&mut self.session, desktop)?;

        if self.session.is_first_launch {
            if let Some(updater) = &self.updater {
                drop(updater.check_and_notify());
                self.session.is_first_launch = false;
            }
        }

        self.windows.create_tray(&mut self.session, desktop)
    }

    fn start_server(&mut self) {
        let hooks = ServerHooks::new(Arc::clone(&self.sink));
        match self.server_launcher.start(self.launch.build_mode, hooks) {
            Ok(server) => {
                self.session.server.set(server);
                info!(mode = self.launch.build_mode.as_str(), "Background server started");
            }
            Err(e) => error!(error = %e, "Failed to start background server"),
        }
    }

    fn on_activate<D>(&mut self, desktop: &mut D) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        if self.session.state == LifecycleState::Starting {
            debug!("Activate before ready, ignoring");
            return Flow::Continue;
        }
        if self.session.has_live_window() {
            return Flow::Continue;
        }

        match self.open_main_window(desktop) {
            Ok(()) => self.session.state = LifecycleState::Active,
            Err(e) => warn!(error = %e, "Failed to reopen main window"),
        }
        Flow::Continue
    }

    #[instrument(skip(self))]
    fn on_open_url(&mut self, url: &str) -> Flow {
        let intent = classify(&DeepLinkPayload::Url(url.to_string()));
        self.session.pending_deep_link.remember(intent);

        if self.windows.focus_main_window(&mut self.session)
            && self.session.pending_deep_link.take().is_update()
        {
            self.trigger_update(UpdateTrigger::OpenUrl);
        }
        Flow::Continue
    }

    #[instrument(skip(self, desktop, args))]
    fn on_second_instance<D>(&mut self, desktop: &mut D, args: &[String], cwd: &Path) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        info!(args = ?args, "Second instance launched");
        self.windows.focus_main_window(&mut self.session);

        if desktop.platform().args_carry_deep_link() {
            let payload = DeepLinkPayload::Args(args.iter().skip(1).cloned().collect());
            if classify(&payload).is_update() {
                self.trigger_update(UpdateTrigger::SecondInstance);
            }
        }
        Flow::Continue
    }

    fn on_ipc<D>(&mut self, desktop: &mut D, message: IpcMessage) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        debug!(channel = message.channel(), "IPC message");
        match message {
            IpcMessage::DownloadStart => self.windows.on_download_start(&mut self.session),
            IpcMessage::DownloadComplete { resize } => {
                self.windows.on_download_complete(&mut self.session, resize)
            }
            IpcMessage::ScanInit => self.windows.on_scan_init(&mut self.session, desktop),
            IpcMessage::ScanViolation {
                badge_data_url,
                violation_count,
            } => self.windows.on_scan_violation(
                &mut self.session,
                desktop,
                &badge_data_url,
                violation_count,
            ),
            IpcMessage::AppLoaded => {
                if self.session.pending_deep_link.take().is_update() {
                    self.trigger_update(UpdateTrigger::AppLoaded);
                }
            }
        }
        Flow::Continue
    }

    fn on_server_event<D>(&mut self, desktop: &mut D, event: ServerEvent) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        match event {
            ServerEvent::SetScanStatus(status) => {
                self.windows.set_tray_status(&mut self.session, Some(status));
                Flow::Continue
            }
            ServerEvent::RequestUpdate => {
                self.trigger_update(UpdateTrigger::ServerRequest);
                Flow::Continue
            }
            ServerEvent::Error(ServerFault::AddrInUse) => {
                error!("Background server port already in use");
                if let Some(server) = self.session.server.clear() {
                    server.close();
                }
                desktop.show_notice(ALREADY_RUNNING_NOTICE);
                self.quit()
            }
            ServerEvent::Error(ServerFault::Other(message)) => {
                error!(error = %message, "Background server error");
                Flow::Continue
            }
        }
    }

    fn on_tray_menu<D>(&mut self, desktop: &mut D, action: TrayAction) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        match action {
            TrayAction::Open => {
                self.windows.on_tray_clicked(&mut self.session, desktop);
                Flow::Continue
            }
            TrayAction::CheckForUpdates => {
                self.trigger_update(UpdateTrigger::TrayMenu);
                Flow::Continue
            }
            TrayAction::Quit => self.quit(),
        }
    }

    fn on_main_window_closed<D>(&mut self, desktop: &mut D) -> Flow
    where
        D: Desktop<Window = W, Tray = T>,
    {
        self.windows.on_main_window_closed(&mut self.session);

        // Every window is closed at this point; only the tray may remain.
        if desktop.platform().has_persistent_dock() {
            self.session.state = LifecycleState::Backgrounded;
            Flow::Continue
        } else {
            self.quit()
        }
    }

    fn on_uncaught_error(&mut self, message: &str) -> Flow {
        let code = fatal::handle_uncaught(&self.session.server, message);
        self.session.state = LifecycleState::Quitting;
        Flow::Exit(code)
    }

    fn trigger_update(&self, trigger: UpdateTrigger) {
        match &self.updater {
            Some(updater) => drop(updater.check_for_updates(trigger)),
            None => warn!(trigger = %trigger, "Update check requested before startup finished"),
        }
    }

    fn quit(&mut self) -> Flow {
        self.before_quit();
        Flow::Quit
    }

    fn exit_fatal(&mut self) -> Flow {
        self.before_quit();
        Flow::Exit(fatal::FATAL_EXIT_CODE)
    }

    /// Log uptime and close the server. Runs once.
    fn before_quit(&mut self) {
        if self.session.state == LifecycleState::Quitting {
            return;
        }
        self.session.state = LifecycleState::Quitting;

        debug!(uptime_ms = self.session.uptime().as_millis(), "uptime");
        self.session.server.close_if_listening();
    }
}
