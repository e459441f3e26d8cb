mod compose;
mod hooks;
