// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`.
//
// ## Architecture notes
//
// Synchronous SDK calls (ML Kit face detection through `Tasks.await`,
// ContentResolver, MediaStore, `Build.VERSION`) are made directly over JNI.
//
// CameraX and the document scanner are lifecycle-bound and deliver their
// output through callbacks, so the host application ships a small glue class
// (`com.hyperpolymath.visionwerk.VisionwerkHost`). Rust asks the glue class to
// bind the camera or launch the scanner; the glue class calls back into the
// `Java_com_hyperpolymath_visionwerk_VisionwerkHost_native*` exports at the
// bottom of this file.

#![cfg(target_os = "android")]

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use jni::objects::{GlobalRef, JByteArray, JClass, JObject, JObjectArray, JString, JValue};
use jni::sys::{jint, jlong};
use jni::{JNIEnv, JavaVM};

use visionwerk_core::error::{Result, VisionwerkError};
use visionwerk_core::frame::{Frame, InputImage, PixelFormat};
use visionwerk_core::types::{
    CameraLens, ClassificationMode, ContourMode, DetectorOptions, LandmarkKind, LandmarkMode,
    PerformanceMode, Point2, RawFace, RawLandmark, ResultFormat, ScanActivityResult,
    ScanOutcome, ScannedPdf, ScannerMode, ScannerOptions,
};

use crate::traits::*;

/// Binary name of the host glue class.
const HOST_CLASS_NAME: &str = "com.hyperpolymath.visionwerk.VisionwerkHost";

/// `Activity.RESULT_OK`.
const RESULT_OK: jint = -1;

/// `Build.VERSION_CODES.Q`, the first release with scoped MediaStore downloads.
const API_Q: u32 = 29;

/// ML Kit `InputImage.IMAGE_FORMAT_NV21`.
const IMAGE_FORMAT_NV21: jint = 17;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

static VM: OnceLock<JavaVM> = OnceLock::new();

/// Receiver for camera frames while an analysis stream is bound.
static FRAME_CALLBACK: Mutex<Option<FrameCallback>> = Mutex::new(None);

/// Scanner result delivered by the host glue, waiting to be taken.
static SCAN_RESULT: Mutex<Option<ScanActivityResult>> = Mutex::new(None);

/// Cached ML Kit detector client and the options it was built with.
static DETECTOR: Mutex<Option<(DetectorOptions, GlobalRef)>> = Mutex::new(None);

/// `VisionwerkHost`, resolved once through the application class loader.
static HOST_CLASS: OnceLock<GlobalRef> = OnceLock::new();

fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code and
    // stays valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| VisionwerkError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(VM.get_or_init(|| vm))
}

/// Attach the current thread (permanently) and return its [`JNIEnv`].
///
/// Detection runs on blocking worker threads that are reused, so the
/// attachment is kept rather than torn down after every call. Local
/// references are never freed on such a thread; go through [`with_env`].
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| VisionwerkError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Run `f` on the attached thread inside its own JNI local frame.
fn with_env<T>(capacity: i32, f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
    let mut env = jni_env()?;
    in_local_frame(&mut env, capacity, f)
}

/// Run `f` inside a nested local frame; every local reference it creates is
/// deleted when it returns.
fn in_local_frame<T>(
    env: &mut JNIEnv<'_>,
    capacity: i32,
    f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>,
) -> Result<T> {
    env.with_local_frame(capacity, |env| Ok::<_, jni::errors::Error>(f(env)))
        .map_err(|e| jni_err("with_local_frame", e))?
}

fn activity() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(VisionwerkError::Bridge(
            "Android context is null, native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

fn jni_err(context: &str, e: jni::errors::Error) -> VisionwerkError {
    VisionwerkError::Bridge(format!("{context}: {e}"))
}

/// The host glue class, loaded through the Activity's class loader.
///
/// `FindClass` on a natively attached thread only sees the system class
/// loader, which does not know application classes.
fn host_class(env: &mut JNIEnv<'_>) -> Result<&'static GlobalRef> {
    if let Some(class) = HOST_CLASS.get() {
        return Ok(class);
    }
    let class = in_local_frame(env, 8, load_host_class)?;
    Ok(HOST_CLASS.get_or_init(|| class))
}

fn load_host_class(env: &mut JNIEnv<'_>) -> Result<GlobalRef> {
    let activity = activity()?;
    let loader = env
        .call_method(&activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .map_err(|e| jni_err("getClassLoader", e))?
        .l()
        .map_err(|e| jni_err("getClassLoader->l", e))?;
    let name = env
        .new_string(HOST_CLASS_NAME)
        .map_err(|e| jni_err("new_string(class name)", e))?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        )
        .map_err(|e| jni_err("ClassLoader.loadClass(VisionwerkHost)", e))?
        .l()
        .map_err(|e| jni_err("loadClass->l", e))?;
    env.new_global_ref(class)
        .map_err(|e| jni_err("new_global_ref(VisionwerkHost)", e))
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Visionwerk platform bridge.
///
/// Zero-sized; shared state lives in the statics above and on the Java side.
pub struct AndroidBridge;

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl AndroidBridge {
    /// Does not touch JNI. The first JNI call happens lazily.
    pub fn new() -> Self {
        Self
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeCameraStream — CameraX through the host glue class
// ---------------------------------------------------------------------------

const CAMERA_PERMISSION: &str = "android.permission.CAMERA";
const PERMISSION_GRANTED: jint = 0;
const REQUEST_CAMERA_PERMISSION: jint = 0x5657_0001;

impl NativeCameraStream for AndroidBridge {
    fn has_camera_permission(&self) -> bool {
        match check_camera_permission() {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!(error = %e, "Android: camera permission check failed");
                false
            }
        }
    }

    fn request_camera_permission(&self) -> Result<()> {
        with_env(8, request_camera_permission)?;
        tracing::info!("Android: camera permission requested");
        Ok(())
    }

    fn start_frame_analysis(&self, lens: CameraLens, on_frame: FrameCallback) -> Result<()> {
        *FRAME_CALLBACK.lock().unwrap_or_else(PoisonError::into_inner) = Some(on_frame);

        let front = matches!(lens, CameraLens::Front);
        let started = with_env(8, |env| {
            let activity = activity()?;
            let class = <&JClass>::from(host_class(env)?.as_obj());
            env.call_static_method(
                class,
                "startFaceAnalysis",
                "(Landroid/app/Activity;Z)V",
                &[JValue::Object(&activity), JValue::Bool(u8::from(front))],
            )
            .map_err(|e| jni_err("VisionwerkHost.startFaceAnalysis", e))?;
            Ok(())
        });
        if let Err(e) = started {
            FRAME_CALLBACK
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            return Err(e);
        }

        tracing::info!(?lens, "Android: frame analysis bound");
        Ok(())
    }

    fn stop_frame_analysis(&self) -> Result<()> {
        with_env(8, |env| {
            let activity = activity()?;
            let class = <&JClass>::from(host_class(env)?.as_obj());
            env.call_static_method(
                class,
                "stopFaceAnalysis",
                "(Landroid/app/Activity;)V",
                &[JValue::Object(&activity)],
            )
            .map_err(|e| jni_err("VisionwerkHost.stopFaceAnalysis", e))?;
            Ok(())
        })?;

        FRAME_CALLBACK
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::info!("Android: frame analysis unbound");
        Ok(())
    }
}

fn request_camera_permission(env: &mut JNIEnv<'_>) -> Result<()> {
    let activity = activity()?;

    let j_perm = env
        .new_string(CAMERA_PERMISSION)
        .map_err(|e| jni_err("new_string(permission)", e))?;
    let perms = env
        .new_object_array(1, "java/lang/String", &j_perm)
        .map_err(|e| jni_err("new_object_array", e))?;

    env.call_static_method(
        "androidx/core/app/ActivityCompat",
        "requestPermissions",
        "(Landroid/app/Activity;[Ljava/lang/String;I)V",
        &[
            JValue::Object(&activity),
            JValue::Object(&perms),
            JValue::Int(REQUEST_CAMERA_PERMISSION),
        ],
    )
    .map_err(|e| jni_err("ActivityCompat.requestPermissions", e))?;
    Ok(())
}

fn check_camera_permission() -> Result<bool> {
    with_env(4, |env| {
        let activity = activity()?;
        let j_perm = env
            .new_string(CAMERA_PERMISSION)
            .map_err(|e| jni_err("new_string(permission)", e))?;

        let status = env
            .call_static_method(
                "androidx/core/content/ContextCompat",
                "checkSelfPermission",
                "(Landroid/content/Context;Ljava/lang/String;)I",
                &[JValue::Object(&activity), JValue::Object(&j_perm)],
            )
            .map_err(|e| jni_err("ContextCompat.checkSelfPermission", e))?
            .i()
            .map_err(|e| jni_err("checkSelfPermission->i", e))?;

        Ok(status == PERMISSION_GRANTED)
    })
}

/// Return an `ImageProxy` to CameraX through the glue class.
fn release_platform_frame(handle: jlong) {
    let released = with_env(4, |env| {
        let class = <&JClass>::from(host_class(env)?.as_obj());
        env.call_static_method(class, "releaseFrame", "(J)V", &[JValue::Long(handle)])
            .map_err(|e| jni_err("VisionwerkHost.releaseFrame", e))?;
        Ok(())
    });
    if let Err(e) = released {
        tracing::error!(handle, error = %e, "Android: failed to release camera frame");
    }
}

// ---------------------------------------------------------------------------
// NativeFaceDetector — ML Kit face detection
// ---------------------------------------------------------------------------

impl NativeFaceDetector for AndroidBridge {
    fn detect_faces(
        &self,
        image: &InputImage,
        rotation_degrees: u32,
        options: &DetectorOptions,
    ) -> Result<Vec<RawFace>> {
        // One frame for the call, one per face and one per landmark; the
        // blocking pool reuses its threads, so nothing may outlive the call.
        let faces = with_env(16, |env| {
            let detector = detector_client(env, options)?;
            let input = to_mlkit_image(env, image, rotation_degrees)?;

            let task = env
                .call_method(
                    detector.as_obj(),
                    "process",
                    "(Lcom/google/mlkit/vision/common/InputImage;)Lcom/google/android/gms/tasks/Task;",
                    &[JValue::Object(&input)],
                )
                .map_err(|e| jni_err("FaceDetector.process", e))?
                .l()
                .map_err(|e| jni_err("process->l", e))?;

            // Tasks.await blocks the calling thread; callers run this off the UI thread.
            let faces = env
                .call_static_method(
                    "com/google/android/gms/tasks/Tasks",
                    "await",
                    "(Lcom/google/android/gms/tasks/Task;)Ljava/lang/Object;",
                    &[JValue::Object(&task)],
                )
                .map_err(|e| {
                    let _ = env.exception_clear();
                    VisionwerkError::Detection(format!("face detection task failed: {e}"))
                })?
                .l()
                .map_err(|e| jni_err("Tasks.await->l", e))?;

            let count = env
                .call_method(&faces, "size", "()I", &[])
                .map_err(|e| jni_err("List.size", e))?
                .i()
                .map_err(|e| jni_err("List.size->i", e))?;

            let mut out = Vec::with_capacity(count.max(0) as usize);
            for i in 0..count {
                let face = in_local_frame(env, 16, |env| {
                    let face = env
                        .call_method(&faces, "get", "(I)Ljava/lang/Object;", &[JValue::Int(i)])
                        .map_err(|e| jni_err("List.get", e))?
                        .l()
                        .map_err(|e| jni_err("List.get->l", e))?;
                    read_face(env, &face)
                })?;
                out.push(face);
            }
            Ok(out)
        })?;

        tracing::debug!(faces = faces.len(), "Android: ML Kit detection complete");
        Ok(faces)
    }
}

fn detector_client(env: &mut JNIEnv<'_>, options: &DetectorOptions) -> Result<GlobalRef> {
    let mut cached = DETECTOR.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some((ref built_with, ref client)) = *cached
        && built_with == options
    {
        return Ok(client.clone());
    }

    let builder = env
        .new_object(
            "com/google/mlkit/vision/face/FaceDetectorOptions$Builder",
            "()V",
            &[],
        )
        .map_err(|e| jni_err("new FaceDetectorOptions.Builder", e))?;

    // FaceDetectorOptions: PERFORMANCE_MODE_FAST = 1 / ACCURATE = 2,
    // *_NONE = 1, *_ALL = 2 for landmarks, classification and contours.
    let performance = match options.performance {
        PerformanceMode::Fast => 1,
        PerformanceMode::Accurate => 2,
    };
    let landmarks = match options.landmarks {
        LandmarkMode::None => 1,
        LandmarkMode::All => 2,
    };
    let classification = match options.classification {
        ClassificationMode::None => 1,
        ClassificationMode::All => 2,
    };
    let contours = match options.contours {
        ContourMode::None => 1,
        ContourMode::All => 2,
    };

    let builder_sig = "(I)Lcom/google/mlkit/vision/face/FaceDetectorOptions$Builder;";
    for (setter, value) in [
        ("setPerformanceMode", performance),
        ("setLandmarkMode", landmarks),
        ("setClassificationMode", classification),
        ("setContourMode", contours),
    ] {
        env.call_method(&builder, setter, builder_sig, &[JValue::Int(value)])
            .map_err(|e| jni_err(setter, e))?;
    }

    let built = env
        .call_method(
            &builder,
            "build",
            "()Lcom/google/mlkit/vision/face/FaceDetectorOptions;",
            &[],
        )
        .map_err(|e| jni_err("FaceDetectorOptions.Builder.build", e))?
        .l()
        .map_err(|e| jni_err("build->l", e))?;

    let client = env
        .call_static_method(
            "com/google/mlkit/vision/face/FaceDetection",
            "getClient",
            "(Lcom/google/mlkit/vision/face/FaceDetectorOptions;)Lcom/google/mlkit/vision/face/FaceDetector;",
            &[JValue::Object(&built)],
        )
        .map_err(|e| jni_err("FaceDetection.getClient", e))?
        .l()
        .map_err(|e| jni_err("getClient->l", e))?;

    let global = env
        .new_global_ref(client)
        .map_err(|e| jni_err("new_global_ref(detector)", e))?;
    *cached = Some((*options, global.clone()));
    tracing::info!(?options, "Android: ML Kit face detector created");
    Ok(global)
}

fn to_mlkit_image<'a>(
    env: &mut JNIEnv<'a>,
    image: &InputImage,
    rotation_degrees: u32,
) -> Result<JObject<'a>> {
    let rotation = rotation_degrees as jint;
    match image.format() {
        PixelFormat::Rgba8 => {
            let config = env
                .get_static_field(
                    "android/graphics/Bitmap$Config",
                    "ARGB_8888",
                    "Landroid/graphics/Bitmap$Config;",
                )
                .map_err(|e| jni_err("Bitmap.Config.ARGB_8888", e))?
                .l()
                .map_err(|e| jni_err("ARGB_8888->l", e))?;
            let bitmap = env
                .call_static_method(
                    "android/graphics/Bitmap",
                    "createBitmap",
                    "(IILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
                    &[
                        JValue::Int(image.width() as jint),
                        JValue::Int(image.height() as jint),
                        JValue::Object(&config),
                    ],
                )
                .map_err(|e| jni_err("Bitmap.createBitmap", e))?
                .l()
                .map_err(|e| jni_err("createBitmap->l", e))?;

            // ARGB_8888 is stored as R, G, B, A bytes in memory.
            let bytes = env
                .byte_array_from_slice(image.data())
                .map_err(|e| jni_err("byte_array_from_slice", e))?;
            let buffer = env
                .call_static_method(
                    "java/nio/ByteBuffer",
                    "wrap",
                    "([B)Ljava/nio/ByteBuffer;",
                    &[JValue::Object(&bytes)],
                )
                .map_err(|e| jni_err("ByteBuffer.wrap", e))?
                .l()
                .map_err(|e| jni_err("wrap->l", e))?;
            env.call_method(
                &bitmap,
                "copyPixelsFromBuffer",
                "(Ljava/nio/Buffer;)V",
                &[JValue::Object(&buffer)],
            )
            .map_err(|e| jni_err("Bitmap.copyPixelsFromBuffer", e))?;

            env.call_static_method(
                "com/google/mlkit/vision/common/InputImage",
                "fromBitmap",
                "(Landroid/graphics/Bitmap;I)Lcom/google/mlkit/vision/common/InputImage;",
                &[JValue::Object(&bitmap), JValue::Int(rotation)],
            )
            .map_err(|e| jni_err("InputImage.fromBitmap", e))?
            .l()
            .map_err(|e| jni_err("fromBitmap->l", e))
        }
        PixelFormat::Nv21 | PixelFormat::Luma8 => {
            let nv21;
            let data = if image.format() == PixelFormat::Nv21 {
                image.data()
            } else {
                nv21 = luma_to_nv21(image)?;
                &nv21
            };
            let bytes = env
                .byte_array_from_slice(data)
                .map_err(|e| jni_err("byte_array_from_slice", e))?;
            env.call_static_method(
                "com/google/mlkit/vision/common/InputImage",
                "fromByteArray",
                "([BIIII)Lcom/google/mlkit/vision/common/InputImage;",
                &[
                    JValue::Object(&bytes),
                    JValue::Int(image.width() as jint),
                    JValue::Int(image.height() as jint),
                    JValue::Int(rotation),
                    JValue::Int(IMAGE_FORMAT_NV21),
                ],
            )
            .map_err(|e| jni_err("InputImage.fromByteArray", e))?
            .l()
            .map_err(|e| jni_err("fromByteArray->l", e))
        }
    }
}

/// Greyscale as NV21 with neutral chroma.
fn luma_to_nv21(image: &InputImage) -> Result<Vec<u8>> {
    let len = PixelFormat::Nv21
        .buffer_len(image.width(), image.height())
        .ok_or_else(|| VisionwerkError::ImageError("greyscale frame too large for NV21".into()))?;
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(image.data());
    out.resize(len, 128);
    Ok(out)
}

fn read_face(env: &mut JNIEnv<'_>, face: &JObject<'_>) -> Result<RawFace> {
    let tracking = env
        .call_method(face, "getTrackingId", "()Ljava/lang/Integer;", &[])
        .map_err(|e| jni_err("Face.getTrackingId", e))?
        .l()
        .map_err(|e| jni_err("getTrackingId->l", e))?;
    let tracking_id = if tracking.is_null() {
        None
    } else {
        Some(
            env.call_method(&tracking, "intValue", "()I", &[])
                .map_err(|e| jni_err("Integer.intValue", e))?
                .i()
                .map_err(|e| jni_err("intValue->i", e))?,
        )
    };

    let smiling_probability = nullable_float(env, face, "getSmilingProbability")?;
    let left_eye_open_probability = nullable_float(env, face, "getLeftEyeOpenProbability")?;
    let right_eye_open_probability = nullable_float(env, face, "getRightEyeOpenProbability")?;

    let head_euler_angle_y = env
        .call_method(face, "getHeadEulerAngleY", "()F", &[])
        .map_err(|e| jni_err("Face.getHeadEulerAngleY", e))?
        .f()
        .map_err(|e| jni_err("getHeadEulerAngleY->f", e))?;
    let head_euler_angle_z = env
        .call_method(face, "getHeadEulerAngleZ", "()F", &[])
        .map_err(|e| jni_err("Face.getHeadEulerAngleZ", e))?
        .f()
        .map_err(|e| jni_err("getHeadEulerAngleZ->f", e))?;

    let all = env
        .call_method(face, "getAllLandmarks", "()Ljava/util/List;", &[])
        .map_err(|e| jni_err("Face.getAllLandmarks", e))?
        .l()
        .map_err(|e| jni_err("getAllLandmarks->l", e))?;
    let count = env
        .call_method(&all, "size", "()I", &[])
        .map_err(|e| jni_err("List.size", e))?
        .i()
        .map_err(|e| jni_err("List.size->i", e))?;

    let mut landmarks = Vec::with_capacity(count.max(0) as usize);
    for i in 0..count {
        if let Some(landmark) = in_local_frame(env, 4, |env| read_landmark(env, &all, i))? {
            landmarks.push(landmark);
        }
    }

    Ok(RawFace {
        tracking_id,
        smiling_probability,
        left_eye_open_probability,
        right_eye_open_probability,
        head_euler_angle_y,
        head_euler_angle_z,
        landmarks,
    })
}

fn nullable_float(env: &mut JNIEnv<'_>, face: &JObject<'_>, getter: &str) -> Result<Option<f32>> {
    let boxed = env
        .call_method(face, getter, "()Ljava/lang/Float;", &[])
        .map_err(|e| jni_err(getter, e))?
        .l()
        .map_err(|e| jni_err(getter, e))?;
    if boxed.is_null() {
        return Ok(None);
    }
    let value = env
        .call_method(&boxed, "floatValue", "()F", &[])
        .map_err(|e| jni_err("Float.floatValue", e))?
        .f()
        .map_err(|e| jni_err("floatValue->f", e))?;
    Ok(Some(value))
}

fn read_landmark(
    env: &mut JNIEnv<'_>,
    all: &JObject<'_>,
    index: jint,
) -> Result<Option<RawLandmark>> {
    let landmark = env
        .call_method(all, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])
        .map_err(|e| jni_err("List.get", e))?
        .l()
        .map_err(|e| jni_err("List.get->l", e))?;
    let kind_code = env
        .call_method(&landmark, "getLandmarkType", "()I", &[])
        .map_err(|e| jni_err("FaceLandmark.getLandmarkType", e))?
        .i()
        .map_err(|e| jni_err("getLandmarkType->i", e))?;
    let Some(kind) = landmark_kind(kind_code) else {
        tracing::debug!(kind_code, "Android: skipping unknown landmark type");
        return Ok(None);
    };
    let point = env
        .call_method(&landmark, "getPosition", "()Landroid/graphics/PointF;", &[])
        .map_err(|e| jni_err("FaceLandmark.getPosition", e))?
        .l()
        .map_err(|e| jni_err("getPosition->l", e))?;
    let x = env
        .get_field(&point, "x", "F")
        .map_err(|e| jni_err("PointF.x", e))?
        .f()
        .map_err(|e| jni_err("PointF.x->f", e))?;
    let y = env
        .get_field(&point, "y", "F")
        .map_err(|e| jni_err("PointF.y", e))?
        .f()
        .map_err(|e| jni_err("PointF.y->f", e))?;
    Ok(Some(RawLandmark {
        kind,
        position: Point2::new(x, y),
    }))
}

/// `FaceLandmark` type constants.
fn landmark_kind(code: jint) -> Option<LandmarkKind> {
    Some(match code {
        0 => LandmarkKind::MouthBottom,
        1 => LandmarkKind::LeftCheek,
        3 => LandmarkKind::LeftEar,
        4 => LandmarkKind::LeftEye,
        5 => LandmarkKind::MouthLeft,
        6 => LandmarkKind::NoseBase,
        7 => LandmarkKind::RightCheek,
        9 => LandmarkKind::RightEar,
        10 => LandmarkKind::RightEye,
        11 => LandmarkKind::MouthRight,
        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// NativeDocumentScanner — GMS document scanner through the host glue class
// ---------------------------------------------------------------------------

impl NativeDocumentScanner for AndroidBridge {
    fn launch_document_scanner(&self, options: &ScannerOptions) -> Result<()> {
        SCAN_RESULT
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        with_env(8, |env| {
            let activity = activity()?;
            let class = <&JClass>::from(host_class(env)?.as_obj());

            // GmsDocumentScannerOptions.SCANNER_MODE_FULL = 1, BASE = 2, BASE_WITH_FILTER = 3.
            let mode = match options.mode {
                ScannerMode::Full => 1,
                ScannerMode::Base => 2,
                ScannerMode::BaseWithFilter => 3,
            };
            let jpeg = options.result_formats.contains(&ResultFormat::Jpeg);

            env.call_static_method(
                class,
                "startDocumentScan",
                "(Landroid/app/Activity;ZIZZI)V",
                &[
                    JValue::Object(&activity),
                    JValue::Bool(u8::from(options.gallery_import_allowed)),
                    JValue::Int(options.page_limit as jint),
                    JValue::Bool(u8::from(jpeg)),
                    JValue::Bool(u8::from(options.wants_pdf())),
                    JValue::Int(mode),
                ],
            )
            .map_err(|e| {
                let _ = env.exception_clear();
                VisionwerkError::Scanner(format!("failed to start document scanner: {e}"))
            })?;
            Ok(())
        })?;

        tracing::info!(page_limit = options.page_limit, "Android: document scanner launched");
        Ok(())
    }

    fn take_scan_result(&self) -> Option<ScanActivityResult> {
        SCAN_RESULT
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

// ---------------------------------------------------------------------------
// NativeContentReader — ContentResolver
// ---------------------------------------------------------------------------

impl NativeContentReader for AndroidBridge {
    fn read_content(&self, uri: &str) -> Result<Vec<u8>> {
        let bytes = with_env(16, |env| {
            let activity = activity()?;

            let uri_obj = parse_uri(env, uri)?;
            let resolver = content_resolver(env, &activity)?;

            let input = env
                .call_method(
                    &resolver,
                    "openInputStream",
                    "(Landroid/net/Uri;)Ljava/io/InputStream;",
                    &[JValue::Object(&uri_obj)],
                )
                .map_err(|e| jni_err("openInputStream", e))?
                .l()
                .map_err(|e| jni_err("openInputStream->l", e))?;
            if input.is_null() {
                return Err(VisionwerkError::Storage(format!(
                    "ContentResolver returned null InputStream for {uri}"
                )));
            }

            let sink = env
                .new_object("java/io/ByteArrayOutputStream", "()V", &[])
                .map_err(|e| jni_err("new ByteArrayOutputStream", e))?;
            let buffer = env
                .new_byte_array(8192)
                .map_err(|e| jni_err("new_byte_array", e))?;

            loop {
                let n = env
                    .call_method(&input, "read", "([B)I", &[JValue::Object(&buffer)])
                    .map_err(|e| jni_err("InputStream.read", e))?
                    .i()
                    .map_err(|e| jni_err("InputStream.read->i", e))?;
                if n < 0 {
                    break;
                }
                env.call_method(
                    &sink,
                    "write",
                    "([BII)V",
                    &[JValue::Object(&buffer), JValue::Int(0), JValue::Int(n)],
                )
                .map_err(|e| jni_err("ByteArrayOutputStream.write", e))?;
            }
            env.call_method(&input, "close", "()V", &[])
                .map_err(|e| jni_err("InputStream.close", e))?;

            let array = env
                .call_method(&sink, "toByteArray", "()[B", &[])
                .map_err(|e| jni_err("toByteArray", e))?
                .l()
                .map_err(|e| jni_err("toByteArray->l", e))?;
            let bytes = env
                .convert_byte_array(JByteArray::from(array))
                .map_err(|e| jni_err("convert_byte_array", e))?;
            Ok(bytes)
        })?;

        tracing::info!(uri, bytes = bytes.len(), "Android: read content URI");
        Ok(bytes)
    }
}

fn parse_uri<'a>(env: &mut JNIEnv<'a>, uri: &str) -> Result<JObject<'a>> {
    let j_uri = env
        .new_string(uri)
        .map_err(|e| jni_err("new_string(uri)", e))?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .map_err(|e| jni_err("Uri.parse", e))?
    .l()
    .map_err(|e| jni_err("Uri.parse->l", e))
}

fn content_resolver<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    env.call_method(
        activity,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )
    .map_err(|e| jni_err("getContentResolver", e))?
    .l()
    .map_err(|e| jni_err("getContentResolver->l", e))
}

// ---------------------------------------------------------------------------
// NativeMediaStore — MediaStore.Downloads (API 29+)
// ---------------------------------------------------------------------------

impl NativeMediaStore for AndroidBridge {
    fn api_level(&self) -> Option<u32> {
        let level = with_env(2, |env| {
            env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
                .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
                .i()
                .map_err(|e| jni_err("SDK_INT->i", e))
        });
        match level {
            Ok(level) => u32::try_from(level).ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Android: could not read SDK_INT");
                None
            }
        }
    }

    fn insert_download(&self, display_name: &str, mime_type: &str, bytes: &[u8]) -> Result<String> {
        if self.api_level().is_none_or(|level| level < API_Q) {
            return Err(VisionwerkError::Storage(
                "MediaStore.Downloads requires API 29".into(),
            ));
        }

        let uri = with_env(32, |env| {
            let activity = activity()?;

            let values = env
                .new_object("android/content/ContentValues", "()V", &[])
                .map_err(|e| jni_err("new ContentValues", e))?;
            for (key, value) in [
                ("_display_name", display_name),
                ("mime_type", mime_type),
                ("relative_path", "Download/"),
            ] {
                let j_key: JString = env
                    .new_string(key)
                    .map_err(|e| jni_err("new_string(key)", e))?;
                let j_value: JString = env
                    .new_string(value)
                    .map_err(|e| jni_err("new_string(value)", e))?;
                env.call_method(
                    &values,
                    "put",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[JValue::Object(&j_key), JValue::Object(&j_value)],
                )
                .map_err(|e| jni_err("ContentValues.put", e))?;
            }

            let collection = env
                .get_static_field(
                    "android/provider/MediaStore$Downloads",
                    "EXTERNAL_CONTENT_URI",
                    "Landroid/net/Uri;",
                )
                .map_err(|e| jni_err("MediaStore.Downloads.EXTERNAL_CONTENT_URI", e))?
                .l()
                .map_err(|e| jni_err("EXTERNAL_CONTENT_URI->l", e))?;

            let resolver = content_resolver(env, &activity)?;
            let item = env
                .call_method(
                    &resolver,
                    "insert",
                    "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
                    &[JValue::Object(&collection), JValue::Object(&values)],
                )
                .map_err(|e| jni_err("ContentResolver.insert", e))?
                .l()
                .map_err(|e| jni_err("insert->l", e))?;
            if item.is_null() {
                return Err(VisionwerkError::Storage(format!(
                    "MediaStore refused to create {display_name}"
                )));
            }

            let output = env
                .call_method(
                    &resolver,
                    "openOutputStream",
                    "(Landroid/net/Uri;)Ljava/io/OutputStream;",
                    &[JValue::Object(&item)],
                )
                .map_err(|e| jni_err("openOutputStream", e))?
                .l()
                .map_err(|e| jni_err("openOutputStream->l", e))?;
            if output.is_null() {
                return Err(VisionwerkError::Storage(format!(
                    "no output stream for {display_name}"
                )));
            }

            let array = env
                .byte_array_from_slice(bytes)
                .map_err(|e| jni_err("byte_array_from_slice", e))?;
            env.call_method(&output, "write", "([B)V", &[JValue::Object(&array)])
                .map_err(|e| jni_err("OutputStream.write", e))?;
            env.call_method(&output, "close", "()V", &[])
                .map_err(|e| jni_err("OutputStream.close", e))?;

            let j_item = env
                .call_method(&item, "toString", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("Uri.toString", e))?
                .l()
                .map_err(|e| jni_err("toString->l", e))?;
            let uri: String = env
                .get_string(&JString::from(j_item))
                .map_err(|e| jni_err("get_string(uri)", e))?
                .into();
            Ok(uri)
        })?;

        tracing::info!(%uri, bytes = bytes.len(), "Android: inserted download");
        Ok(uri)
    }
}

// ---------------------------------------------------------------------------
// NativeDownloadsDir — Environment.getExternalStoragePublicDirectory
// ---------------------------------------------------------------------------

impl NativeDownloadsDir for AndroidBridge {
    fn public_downloads_dir(&self) -> Result<PathBuf> {
        let path = with_env(8, |env| {
            let kind = env
                .get_static_field(
                    "android/os/Environment",
                    "DIRECTORY_DOWNLOADS",
                    "Ljava/lang/String;",
                )
                .map_err(|e| jni_err("Environment.DIRECTORY_DOWNLOADS", e))?
                .l()
                .map_err(|e| jni_err("DIRECTORY_DOWNLOADS->l", e))?;
            let dir = env
                .call_static_method(
                    "android/os/Environment",
                    "getExternalStoragePublicDirectory",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&kind)],
                )
                .map_err(|e| jni_err("getExternalStoragePublicDirectory", e))?
                .l()
                .map_err(|e| jni_err("getExternalStoragePublicDirectory->l", e))?;
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("File.getAbsolutePath", e))?
                .l()
                .map_err(|e| jni_err("getAbsolutePath->l", e))?;
            let path: String = env
                .get_string(&JString::from(path))
                .map_err(|e| jni_err("get_string(path)", e))?
                .into();
            Ok(path)
        })?;

        Ok(PathBuf::from(path))
    }
}

// ---------------------------------------------------------------------------
// Callbacks from the host glue class
// ---------------------------------------------------------------------------

/// Called by `VisionwerkHost` for every `ImageProxy` CameraX delivers.
///
/// `handle` identifies the proxy on the Java side; it is closed when the
/// resulting [`Frame`] is released. `data` is NV21 and null when the proxy
/// carried no image.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_visionwerk_VisionwerkHost_nativeOnFrame<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    data: JByteArray<'local>,
    width: jint,
    height: jint,
    rotation_degrees: jint,
) {
    let image = if data.is_null() {
        None
    } else {
        camera_image(&env, &data, width, height)
            .inspect_err(|e| tracing::warn!(error = %e, "Android: unusable camera buffer"))
            .ok()
    };

    let frame = Frame::new(image, rotation_degrees.max(0) as u32, move || {
        release_platform_frame(handle)
    });

    let callback = FRAME_CALLBACK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match callback {
        Some(on_frame) => on_frame(frame),
        // Dropping the frame releases it.
        None => drop(frame),
    }
}

/// Copy an NV21 camera buffer, rejecting dimensions that are negative or
/// inconsistent with its length.
fn camera_image(
    env: &JNIEnv<'_>,
    data: &JByteArray<'_>,
    width: jint,
    height: jint,
) -> Result<InputImage> {
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(VisionwerkError::ImageError(format!(
            "invalid camera frame size {width}x{height}"
        )));
    };
    let bytes = env
        .convert_byte_array(data)
        .map_err(|e| jni_err("convert_byte_array(frame)", e))?;
    InputImage::new(width, height, PixelFormat::Nv21, bytes)
}

/// Called by `VisionwerkHost` from the scanner activity-result callback.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_visionwerk_VisionwerkHost_nativeOnScanResult<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    result_code: jint,
    page_uris: JObjectArray<'local>,
    pdf_uri: JString<'local>,
    pdf_page_count: jint,
) {
    let result = if result_code != RESULT_OK {
        ScanActivityResult::Cancelled
    } else {
        ScanActivityResult::Ok(read_scan_outcome(&mut env, &page_uris, &pdf_uri, pdf_page_count))
    };
    tracing::info!(?result, "Android: document scanner returned");
    *SCAN_RESULT.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
}

fn read_scan_outcome(
    env: &mut JNIEnv<'_>,
    page_uris: &JObjectArray<'_>,
    pdf_uri: &JString<'_>,
    pdf_page_count: jint,
) -> Option<ScanOutcome> {
    if page_uris.is_null() && pdf_uri.is_null() {
        return None;
    }

    let mut outcome = ScanOutcome::default();
    if !page_uris.is_null() {
        let len = env.get_array_length(page_uris).unwrap_or(0);
        for i in 0..len {
            let Ok(element) = env.get_object_array_element(page_uris, i) else {
                continue;
            };
            if let Ok(uri) = env.get_string(&JString::from(element)) {
                outcome.page_uris.push(uri.into());
            }
        }
    }
    if !pdf_uri.is_null()
        && let Ok(uri) = env.get_string(pdf_uri)
    {
        outcome.pdf = Some(ScannedPdf {
            uri: uri.into(),
            page_count: pdf_page_count.max(0) as u32,
        });
    }
    Some(outcome)
}
