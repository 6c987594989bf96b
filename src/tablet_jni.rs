//! JNI bindings letting the Android input handler drive the tablet engine.
//!
//! The Java side forwards every touch, hover and scale callback here. This
//! module owns a global Tokio runtime for the transport, a single input
//! session, and calls back into static methods of `NativeInputHandler` for
//! toolbar, canvas and pointer side effects.

use jni::objects::{JClass, JFloatArray, JString, JValue};
use jni::sys::{jboolean, jfloat, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;
use tokio::sync::{broadcast, mpsc};

use crate::config::TabletConfig;
use crate::error::TransportError;
use crate::input::{
    CanvasGeometry, DirectPointerSink, GestureSession, InputHost, MotionAction, MotionSample,
    OutputSink, PinchZoom, PointerCoords, RemotePointer, ScrollDirection, ToolType, TouchOutcome,
    Zoomer,
};
use crate::net::{NetworkClient, NetworkSink};

/// Global Tokio runtime for the tablet transport.
static TABLET_RUNTIME: OnceCell<Runtime> = OnceCell::new();
/// Global container for the active input session.
static INPUT_SESSION: OnceCell<Arc<Mutex<Option<ActiveSession>>>> = OnceCell::new();
/// Global broadcast sender for shutdown signals.
static SHUTDOWN_SIGNAL: OnceCell<broadcast::Sender<()>> = OnceCell::new();

/// Global reference to the Java VM.
static JAVA_VM: OnceCell<jni::JavaVM> = OnceCell::new();
/// Global reference to the `NativeInputHandler` Java class.
static HANDLER_CLASS: OnceCell<jni::objects::GlobalRef> = OnceCell::new();

type Session = GestureSession<Box<dyn OutputSink + Send>, JniHost>;

struct ActiveSession {
    gesture: Session,
    pinch: PinchZoom,
}

/// Canvas state pushed from Java, plus the pending delegation flag.
struct JniHost {
    geometry: CanvasGeometry,
    delegated: bool,
}

impl InputHost for JniHost {
    fn canvas(&self) -> CanvasGeometry {
        self.geometry
    }

    fn show_toolbar(&mut self) {
        call_handler("showToolbar", "()V", &[]);
    }

    fn delegate_two_finger(&mut self, _sample: &MotionSample) {
        // Java owns the MotionEvent and feeds its own scale detector
        self.delegated = true;
    }
}

/// Remote pointer implemented by the Java pointer of the session.
struct JavaPointer;

impl JavaPointer {
    fn call_xy(method: &str, x: i32, y: i32, meta: i32) {
        call_handler(
            method,
            "(III)V",
            &[JValue::Int(x), JValue::Int(y), JValue::Int(meta)],
        );
    }
}

impl RemotePointer for JavaPointer {
    fn left_button_down(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("leftButtonDown", x, y, meta);
    }

    fn right_button_down(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("rightButtonDown", x, y, meta);
    }

    fn middle_button_down(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("middleButtonDown", x, y, meta);
    }

    fn release_button(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("releaseButton", x, y, meta);
    }

    fn move_mouse_button_down(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("moveMouseButtonDown", x, y, meta);
    }

    fn move_mouse_button_up(&mut self, x: i32, y: i32, meta: i32) {
        Self::call_xy("moveMouseButtonUp", x, y, meta);
    }

    fn scroll(&mut self, direction: ScrollDirection, x: i32, y: i32, meta: i32) {
        let code = match direction {
            ScrollDirection::Up => 0,
            ScrollDirection::Down => 1,
            ScrollDirection::Left => 2,
            ScrollDirection::Right => 3,
        };
        call_handler(
            "scroll",
            "(IIII)V",
            &[
                JValue::Int(code),
                JValue::Int(x),
                JValue::Int(y),
                JValue::Int(meta),
            ],
        );
    }

    fn pan_to_pointer(&mut self) {
        call_handler("movePanToMakePointerVisible", "()V", &[]);
    }
}

/// Canvas zoom/pan implemented on the Java side.
struct JavaZoomer {
    zoom: f32,
}

impl Zoomer for JavaZoomer {
    fn zoom_factor(&self) -> f32 {
        self.zoom
    }

    fn change_zoom(&mut self, scale_factor: f32, focus_x: f32, focus_y: f32) {
        call_handler(
            "changeZoom",
            "(FFF)V",
            &[
                JValue::Float(scale_factor),
                JValue::Float(focus_x),
                JValue::Float(focus_y),
            ],
        );
    }

    fn relative_pan(&mut self, dx: i32, dy: i32) {
        call_handler("relativePan", "(II)V", &[JValue::Int(dx), JValue::Int(dy)]);
    }

    fn show_toolbar(&mut self) {
        call_handler("showToolbar", "()V", &[]);
    }
}

/// Initializes or retrieves the global Tokio runtime.
///
/// The transport worker, endpoint resolution and report handlers all run on it.
///
/// # Returns
///
/// A static reference to the initialized `tokio::runtime::Runtime`.
fn get_or_init_tablet_runtime() -> &'static Runtime {
    TABLET_RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to build tablet Tokio runtime")
    })
}

/// Initializes or retrieves the global broadcast sender for shutdown signals.
///
/// # Returns
///
/// A static reference to the `broadcast::Sender<()>`.
fn get_or_init_shutdown_signal() -> &'static broadcast::Sender<()> {
    SHUTDOWN_SIGNAL.get_or_init(|| {
        let (tx, _) = broadcast::channel(16);
        tx
    })
}

/// Calls a static `NativeInputHandler` method, logging JNI failures.
fn call_handler(method: &str, sig: &str, args: &[JValue]) {
    let Some(vm) = JAVA_VM.get() else {
        error!("Java VM not available");
        return;
    };
    let Some(class) = HANDLER_CLASS.get() else {
        error!("NativeInputHandler class not cached");
        return;
    };
    let mut env = match vm.attach_current_thread() {
        Ok(env) => env,
        Err(e) => {
            error!("Failed to attach to Java thread: {}", e);
            return;
        }
    };
    if let Err(e) = env.call_static_method(class, method, sig, args) {
        error!("Failed to call {}: {}", method, e);
    }
}

/// Forwards a transport error to Java as a displayable message.
fn report_transport_error(err: &TransportError) {
    let Some(vm) = JAVA_VM.get() else {
        return;
    };
    let Some(class) = HANDLER_CLASS.get() else {
        return;
    };
    let mut env = match vm.attach_current_thread() {
        Ok(env) => env,
        Err(e) => {
            error!("Failed to attach to Java thread: {}", e);
            return;
        }
    };
    if let Ok(message) = env.new_string(err.to_string()) {
        let args = [JValue::Object(&message)];
        if let Err(e) =
            env.call_static_method(class, "onTransportError", "(Ljava/lang/String;)V", &args)
        {
            error!("Failed to call onTransportError: {}", e);
        }
    }
}

/// Runs `f` against the active session, if any.
fn with_session<T>(f: impl FnOnce(&mut ActiveSession) -> T) -> Option<T> {
    let container = INPUT_SESSION.get()?;
    match container.lock() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(e) => {
            error!("Failed to lock input session: {}", e);
            None
        }
    }
}

/// Reads `[x, y, pressure]` triples of historical samples.
fn read_history(env: &JNIEnv, history: &JFloatArray, tool: ToolType) -> Vec<PointerCoords> {
    if history.is_null() {
        return Vec::new();
    }
    let len = match env.get_array_length(history) {
        Ok(len) if len > 0 => len as usize,
        Ok(_) => return Vec::new(),
        Err(e) => {
            error!("Failed to get history length: {}", e);
            return Vec::new();
        }
    };
    let mut raw = vec![0.0f32; len];
    if let Err(e) = env.get_float_array_region(history, 0, &mut raw) {
        error!("Failed to read history samples: {}", e);
        return Vec::new();
    }
    raw.chunks_exact(3)
        .map(|c| PointerCoords {
            x: c[0],
            y: c[1],
            pressure: c[2],
            tool,
        })
        .collect()
}


/// Stops the active session, if any.
///
/// Sends the shutdown signal to the report handler, closes a stroke that is
/// still down on the remote side and drops the session together with its
/// transport.
///
/// # Returns
///
/// `true` if a session was running.
fn stop_active_session() -> bool {
    if let Some(shutdown_tx) = SHUTDOWN_SIGNAL.get() {
        let _ = shutdown_tx.send(());
    }

    let Some(container) = INPUT_SESSION.get() else {
        return false;
    };
    let previous = match container.lock() {
        Ok(mut guard) => guard.take(),
        Err(e) => {
            error!("Failed to lock input session: {}", e);
            return false;
        }
    };

    match previous {
        Some(mut session) => {
            session.gesture.reset();
            true
        }
        None => false,
    }
}

/// JNI entry point to initialize the native input engine.
///
/// This function should be called once when the Android application starts. It sets up
/// logging, the Tokio runtime, the shutdown signal and the session container, and caches
/// the Java VM and the `NativeInputHandler` class for callbacks.
///
/// # Arguments
///
/// * `env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeInit(
    mut env: JNIEnv,
    _class: JClass,
) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("VncTablet-Rust"),
    );

    info!("Initializing native tablet input");

    get_or_init_tablet_runtime();
    get_or_init_shutdown_signal();

    if let Ok(vm) = env.get_java_vm() {
        let _ = JAVA_VM.set(vm);
    }

    if let Ok(handler_class) = env.find_class("com/vnctablet/input/NativeInputHandler") {
        if let Ok(global_ref) = env.new_global_ref(handler_class) {
            let _ = HANDLER_CLASS.set(global_ref);
        }
    }

    INPUT_SESSION.get_or_init(|| Arc::new(Mutex::new(None)));

    info!("Native tablet input initialized");
}

/// JNI entry point to start an input session.
///
/// In tablet mode events stream to `host:port` and the host is resolved in the
/// background. In direct mode events drive the Java pointer and `host`/`port` are
/// ignored. A session that is already running is stopped first, after the new
/// arguments have been validated.
///
/// # Arguments
///
/// * `env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
/// * `host` - Host name or address of the GfxTablet receiver.
/// * `port` - UDP port of the receiver.
/// * `image_width` - Width of the remote desktop.
/// * `image_height` - Height of the remote desktop.
/// * `direct` - `JNI_TRUE` to emulate the remote mouse instead of streaming.
///
/// # Returns
///
/// `JNI_TRUE` if the session starts, `JNI_FALSE` on invalid arguments.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeStart(
    mut env: JNIEnv,
    _class: JClass,
    host: JString,
    port: jint,
    image_width: jint,
    image_height: jint,
    direct: jboolean,
) -> jboolean {
    let geometry = match CanvasGeometry::new(image_width, image_height) {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e);
            return JNI_FALSE;
        }
    };

    let direct = direct == JNI_TRUE;
    let mut config = TabletConfig::default();
    if !direct {
        config.host = if host.is_null() {
            String::new()
        } else {
            match env.get_string(&host) {
                Ok(s) => s.into(),
                Err(e) => {
                    error!("Failed to get tablet host: {}", e);
                    return JNI_FALSE;
                }
            }
        };
        config.port = match TabletConfig::port_from_jint(port) {
            Ok(p) => p,
            Err(e) => {
                error!("{}", e);
                return JNI_FALSE;
            }
        };
        if let Err(e) = config.validate() {
            error!("Invalid tablet configuration: {}", e);
            return JNI_FALSE;
        }
    }

    let Some(container) = INPUT_SESSION.get() else {
        error!("Input session container not initialized");
        return JNI_FALSE;
    };

    // the old report handler must see the shutdown before the new one subscribes
    if stop_active_session() {
        info!("Replaced running tablet input session");
    }

    let sink: Box<dyn OutputSink + Send> = if direct {
        info!("Starting direct input session {}x{}", image_width, image_height);
        Box::new(DirectPointerSink::new(JavaPointer))
    } else {
        info!(
            "Starting tablet input session {}x{} to {}:{}",
            image_width, image_height, config.host, config.port
        );
        let runtime = get_or_init_tablet_runtime();
        let (client, reports) = NetworkClient::spawn(runtime.handle());
        spawn_report_handler(reports);
        spawn_endpoint_configuration(&client, &config);
        Box::new(NetworkSink::new(client))
    };

    let host = JniHost {
        geometry,
        delegated: false,
    };
    let session = ActiveSession {
        gesture: GestureSession::new(sink, host, &config),
        pinch: PinchZoom::new(config.min_scale_factor),
    };

    match container.lock() {
        Ok(mut guard) => *guard = Some(session),
        Err(e) => {
            error!("Failed to lock input session: {}", e);
            return JNI_FALSE;
        }
    }

    info!("Tablet input session started");
    JNI_TRUE
}

/// JNI entry point to stop the input session.
///
/// Pending events of an unresolved tap window are discarded, a stroke already
/// on the remote side is lifted, and the transport worker stops once the session
/// is dropped.
///
/// # Arguments
///
/// * `_env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
///
/// # Returns
///
/// `JNI_TRUE` to indicate that the stop command was issued.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeStop(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    info!("Stopping tablet input session");

    if !stop_active_session() {
        warn!("No tablet input session was running");
    }

    info!("Tablet input session stopped");
    JNI_TRUE
}

/// JNI entry point to update pan, zoom and remote image size.
///
/// # Arguments
///
/// * `_env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
/// * `abs_x` - Horizontal pan offset in remote pixels.
/// * `abs_y` - Vertical pan offset in remote pixels.
/// * `top` - Height of the view area above the canvas, in screen pixels.
/// * `zoom` - Current zoom factor.
/// * `image_width` - Width of the remote desktop.
/// * `image_height` - Height of the remote desktop.
///
/// # Returns
///
/// `JNI_TRUE` if the geometry is valid and applied, `JNI_FALSE` otherwise.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeSetCanvas(
    _env: JNIEnv,
    _class: JClass,
    abs_x: jfloat,
    abs_y: jfloat,
    top: jfloat,
    zoom: jfloat,
    image_width: jint,
    image_height: jint,
) -> jboolean {
    let geometry = match CanvasGeometry::new(image_width, image_height)
        .and_then(|g| g.with_pan(abs_x, abs_y).with_top(top).with_zoom(zoom))
    {
        Ok(g) => g,
        Err(e) => {
            error!("Rejected canvas update: {}", e);
            return JNI_FALSE;
        }
    };

    match with_session(|session| session.gesture.host_mut().geometry = geometry) {
        Some(()) => JNI_TRUE,
        None => JNI_FALSE,
    }
}

/// JNI entry point for `onTouchEvent` and `onGenericMotionEvent`.
///
/// Touch and hover actions both arrive here; hover actions bypass the tap window.
///
/// # Arguments
///
/// * `env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
/// * `action` - The Android `MotionEvent` action code, already masked.
/// * `pointer_count` - Number of pointers in the event.
/// * `x` - Screen x of the primary pointer.
/// * `y` - Screen y of the primary pointer.
/// * `pressure` - Pressure of the primary pointer.
/// * `tool_type` - The Android tool type of the primary pointer.
/// * `meta_state` - Keyboard meta state, forwarded to direct pointer calls.
/// * `history` - `[x, y, pressure]` triples of the primary pointer, oldest first. May be null.
///
/// # Returns
///
/// `1` if the caller must pass the event to its scale/gesture detectors, `0` if it was
/// consumed, `-1` if there is no session or the action is unknown.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeTouchEvent(
    env: JNIEnv,
    _class: JClass,
    action: jint,
    pointer_count: jint,
    x: jfloat,
    y: jfloat,
    pressure: jfloat,
    tool_type: jint,
    meta_state: jint,
    history: JFloatArray,
) -> jint {
    let Some(action) = MotionAction::from_android(action) else {
        warn!("Ignoring unsupported motion action {}", action);
        return -1;
    };
    let tool = ToolType::from_android(tool_type);
    let sample = MotionSample {
        action,
        pointer_count: pointer_count.max(0) as usize,
        current: PointerCoords {
            x,
            y,
            pressure,
            tool,
        },
        history: read_history(&env, &history, tool),
    };

    let outcome = with_session(|session| {
        session.gesture.sink_mut().set_meta(meta_state);
        session.gesture.host_mut().delegated = false;
        let outcome = session.gesture.handle_touch(&sample);
        session.gesture.host().delegated || outcome == TouchOutcome::Delegated
    });

    match outcome {
        Some(true) => 1,
        Some(false) => 0,
        None => -1,
    }
}

/// JNI entry point for the scale detector's `onScaleBegin`.
///
/// # Returns
///
/// `JNI_TRUE` if the detector should go on reporting this scale gesture.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeScaleBegin(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    match with_session(|session| session.pinch.on_scale_begin()) {
        Some(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// JNI entry point for the scale detector's `onScale`.
///
/// Small factors are ignored until a scale is under way; after that the canvas
/// zoom follows the detector around the focus point.
///
/// # Arguments
///
/// * `_env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
/// * `scale_factor` - Scale change since the previous callback.
/// * `focus_x` - Screen x of the pinch focus.
/// * `focus_y` - Screen y of the pinch focus.
///
/// # Returns
///
/// `JNI_TRUE` if the scale event was consumed, `JNI_FALSE` otherwise.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeScale(
    _env: JNIEnv,
    _class: JClass,
    scale_factor: jfloat,
    focus_x: jfloat,
    focus_y: jfloat,
) -> jboolean {
    let consumed = with_session(|session| {
        let mut zoomer = JavaZoomer {
            zoom: session.gesture.host().geometry.zoom(),
        };
        session
            .pinch
            .on_scale(&mut zoomer, scale_factor, focus_x, focus_y)
    });
    match consumed {
        Some(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// JNI entry point for the scale detector's `onScaleEnd`.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeScaleEnd(
    _env: JNIEnv,
    _class: JClass,
) {
    with_session(|session| session.pinch.on_scale_end());
}

/// JNI entry point for the gesture detector's `onScroll`.
///
/// # Arguments
///
/// * `_env` - The JNI environment.
/// * `_class` - The Java class from which this method is called.
/// * `distance_x` - Horizontal scroll distance in screen pixels.
/// * `distance_y` - Vertical scroll distance in screen pixels.
/// * `pointer_count` - Number of pointers in the current event.
///
/// # Returns
///
/// `JNI_TRUE` if the canvas was panned, `JNI_FALSE` otherwise.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_vnctablet_input_NativeInputHandler_nativeScroll(
    _env: JNIEnv,
    _class: JClass,
    distance_x: jfloat,
    distance_y: jfloat,
    pointer_count: jint,
) -> jboolean {
    let consumed = with_session(|session| {
        let mut zoomer = JavaZoomer {
            zoom: session.gesture.host().geometry.zoom(),
        };
        session.pinch.on_scroll(
            &mut zoomer,
            distance_x,
            distance_y,
            pointer_count.max(0) as usize,
        )
    });
    match consumed {
        Some(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// Resolves the tablet endpoint in the background and reports the outcome.
fn spawn_endpoint_configuration(client: &NetworkClient, config: &TabletConfig) {
    let result_rx = client.reconfigure(config.host.clone(), config.port);
    get_or_init_tablet_runtime().spawn(async move {
        match result_rx.await {
            Ok(Ok(addr)) => info!("Tablet endpoint ready at {}", addr),
            Ok(Err(e)) => report_transport_error(&e),
            Err(_) => warn!("Endpoint configuration task ended without a result"),
        }
    });
}

/// Spawns the task forwarding transport errors to Java.
///
/// Each transport gets its own handler. It stops on the shutdown signal or when
/// its transport worker is gone.
///
/// # Arguments
///
/// * `reports` - The error channel returned by `NetworkClient::spawn`.
fn spawn_report_handler(mut reports: mpsc::UnboundedReceiver<TransportError>) {
    let runtime = get_or_init_tablet_runtime();
    let mut shutdown_rx = get_or_init_shutdown_signal().subscribe();

    runtime.spawn(async move {
        info!("Transport report handler started");

        loop {
            tokio::select! {
                report = reports.recv() => match report {
                    Some(err) => report_transport_error(&err),
                    None => break,
                },
                _ = shutdown_rx.recv() => {
                    info!("Report handler received shutdown signal");
                    break;
                }
            }
        }

        info!("Transport report handler stopped");
    });
}
