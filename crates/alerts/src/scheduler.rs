/// Port for whatever decides *when* the low-stock check runs.
///
/// The hosting process owns the timer; the core only asks for an immediate
/// run or a stop.
pub trait AlertScheduler {
    /// Request a check as soon as possible. Repeated requests coalesce.
    fn trigger(&self);

    /// Stop scheduling and wait for an in-flight check to finish.
    fn shutdown(self)
    where
        Self: Sized;
}
