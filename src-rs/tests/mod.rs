
#[cfg(test)]
pub mod session {
    pub mod id;
    pub mod manager;
    pub mod store;
}

#[cfg(test)]
pub mod runtime {
    pub mod body;
    pub mod client;
    pub mod trace;
}
