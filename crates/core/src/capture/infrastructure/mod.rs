pub mod openni_device;
