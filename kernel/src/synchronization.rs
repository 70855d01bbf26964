pub mod primitive;

/// Serializes access to shared boot state. See [`primitive::PhantomSpinlock`].
pub type Spinlock<T> = lock_api::Mutex<primitive::PhantomSpinlock, T>;
