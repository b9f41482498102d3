// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Visionwerk — Native platform bridge abstractions.
//!
//! This crate defines the traits through which the screens reach the
//! closed-source collaborators: the camera pipeline, the on-device face
//! detector, the document scanner and the platform's public storage. Android
//! goes through JNI; every other target gets a stub so desktop and CI builds
//! work.

pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

/// Returns the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        Box::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        Box::new(stub::StubBridge::new())
    }
}
