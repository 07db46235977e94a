use uuid::Uuid;

pub type ScriptId = String;
pub type SessionId = Uuid;
pub type Program = String;
pub type Args = Vec<String>;
pub type OutputBlob = bytes::Bytes;
