use super::monitoring_session::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPermission {
    Granted,
    Denied,
}

/// Host-side camera permission check. Must report `Granted` before any
/// frame source is started.
pub trait PermissionGate: Send {
    fn camera_permission(&mut self) -> CameraPermission;
}

/// Gate with a fixed answer, for recorded sessions and tests.
pub struct StaticPermissionGate {
    permission: CameraPermission,
}

impl StaticPermissionGate {
    pub fn new(permission: CameraPermission) -> Self {
        Self { permission }
    }

    pub fn granted() -> Self {
        Self::new(CameraPermission::Granted)
    }
}

impl PermissionGate for StaticPermissionGate {
    fn camera_permission(&mut self) -> CameraPermission {
        self.permission
    }
}

/// Aborts session start unless camera access has been granted.
pub fn ensure_camera_access(gate: &mut dyn PermissionGate) -> Result<(), SessionError> {
    match gate.camera_permission() {
        CameraPermission::Granted => Ok(()),
        CameraPermission::Denied => {
            log::error!("Camera permission denied");
            Err(SessionError::PermissionDenied)
        }
    }
}
