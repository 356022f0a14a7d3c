/// Read side of the shared online/offline signal.
pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> bool;

    fn is_offline(&self) -> bool {
        !self.is_online()
    }
}
