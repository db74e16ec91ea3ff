pub mod domain;
pub mod notifications;
pub mod ports;
pub mod session;

pub use domain::{
    AccessToken, AiEditPolicy, Document, DocumentStats, EditorStatus, Notification,
    NotificationId, NotificationKind, RemoteContent, RemoteCredentials, RemoteFile, RemoteUser,
};
pub use notifications::NotificationQueue;
pub use ports::{
    Clock, CompletionService, DocumentStore, FileHandle, FileHost, OpenedFile, PortError,
    PortResult, SystemClock, TokenStore,
};
pub use session::{
    AiOutcome, EditorSession, SessionError, SessionOptions, SessionPorts, SessionResult,
    SessionSnapshot,
};
