use crate::{
    AppResult, DesktopState, FeedUpdateService, ScanServer, TaoDesktop, TaoWindow, TrayManager,
    config::ShellConfig, icons, tray_manager::tray_action,
};

use stethoscope_shell_core::{
    AppLifecycleController, BuildMode, Collaborators, ContentSource, EventSink, Flow,
    LaunchContext, LoopbackInstanceLock, Platform, ShellEvent, UpdateService, fatal,
};

use std::{
    env, panic, process,
    sync::{Arc, Mutex, PoisonError},
};

use tao::{
    event::{Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tray_icon::{MouseButton, MouseButtonState, TrayIconEvent, menu::MenuEvent};

/// [`EventSink`] posting onto the tao event loop from any thread.
pub(crate) struct ProxySink {
    proxy: Mutex<EventLoopProxy<ShellEvent>>,
}

impl ProxySink {
    pub(crate) fn new(proxy: EventLoopProxy<ShellEvent>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
        }
    }
}

impl EventSink for ProxySink {
    fn emit(&self, event: ShellEvent) {
        let proxy = self.proxy.lock().unwrap_or_else(PoisonError::into_inner);
        if proxy.send_event(event).is_err() {
            debug!("Event loop closed, dropping event");
        }
    }
}

/// Map a controller decision onto the event loop.
pub(crate) fn control_flow_for(flow: Flow) -> Option<ControlFlow> {
    match flow {
        Flow::Continue => None,
        Flow::Quit => Some(ControlFlow::Exit),
        Flow::Exit(code) => Some(ControlFlow::ExitWithCode(code)),
    }
}

/// Wire the shell together and run the event loop. Only returns on a
/// startup failure.
pub(crate) fn run(config: ShellConfig, log_guard: Option<WorkerGuard>) -> AppResult<()> {
    let build_mode = BuildMode::from_env();
    let resources_dir = ShellConfig::resources_dir()?;

    let icons = icons::load_status_icons(&config.icon_dir(&resources_dir))?;
    let content_url = ContentSource::from_env(&resources_dir)?.url()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("stethoscope-rt")
        .build()?;
    let handle = runtime.handle().clone();

    let event_loop = EventLoopBuilder::<ShellEvent>::with_user_event().build();
    let sink: Arc<dyn EventSink> = Arc::new(ProxySink::new(event_loop.create_proxy()));

    TrayIconEvent::set_event_handler(Some({
        let sink = Arc::clone(&sink);
        move |event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                sink.emit(ShellEvent::TrayClicked);
            }
        }
    }));

    MenuEvent::set_event_handler(Some({
        let sink = Arc::clone(&sink);
        move |event: MenuEvent| match tray_action(&event.id.0) {
            Some(action) => sink.emit(ShellEvent::TrayMenu(action)),
            None => debug!(id = %event.id.0, "Unhandled menu event"),
        }
    }));

    let update_service = FeedUpdateService::new(
        config.updates.feed_url.as_deref(),
        env!("CARGO_PKG_VERSION"),
        build_mode,
        config.updates.auto_check,
    )?;

    let collaborators = Collaborators {
        icons,
        instance_lock: Box::new(LoopbackInstanceLock::new(
            config.instance.port,
            handle.clone(),
            Arc::clone(&sink),
        )),
        server_launcher: Box::new(ScanServer::new(
            config.server.port,
            handle.clone(),
            Arc::clone(&sink),
        )),
        update_service: Arc::new(update_service) as Arc<dyn UpdateService>,
        runtime: handle,
        sink: Arc::clone(&sink),
    };

    let launch = LaunchContext {
        argv: env::args().collect(),
        cwd: env::current_dir()?,
        build_mode,
        content_url,
    };

    let mut controller =
        AppLifecycleController::<TaoWindow, TrayManager>::new(launch, collaborators);

    let server_slot = controller.server_slot();
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let code = fatal::handle_uncaught(&server_slot, &info.to_string());
        default_hook(info);
        process::exit(code);
    }));

    let mut desktop_state = DesktopState::new(Platform::current(), Arc::clone(&sink));
    info!(mode = build_mode.as_str(), "Stethoscope shell starting");

    event_loop.run(move |event, target, control_flow| {
        if !matches!(*control_flow, ControlFlow::ExitWithCode(_)) {
            *control_flow = ControlFlow::Wait;
        }

        let shell_event = match event {
            // Deferred by one loop iteration.
            Event::NewEvents(StartCause::Init) => {
                sink.emit(ShellEvent::Ready);
                None
            }
            Event::UserEvent(event) => Some(event),
            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
                ..
            } => {
                let is_main = controller
                    .session()
                    .main_window()
                    .and_then(TaoWindow::id)
                    == Some(window_id);
                is_main.then_some(ShellEvent::MainWindowClosed)
            }
            #[cfg(target_os = "macos")]
            Event::Opened { urls } => {
                for url in urls {
                    sink.emit(ShellEvent::OpenUrl(url.to_string()));
                }
                None
            }
            #[cfg(target_os = "macos")]
            Event::Reopen { .. } => Some(ShellEvent::Activate),
            Event::LoopDestroyed => Some(ShellEvent::BeforeQuit),
            _ => None,
        };

        if let Some(shell_event) = shell_event {
            let mut desktop = TaoDesktop::new(target, &mut desktop_state);
            if let Some(flow) = control_flow_for(controller.dispatch(&mut desktop, shell_event)) {
                *control_flow = flow;
            }
        }

        // Keep the runtime and the log writer alive for the app's lifetime.
        let _ = (&runtime, &log_guard);
    })
}
