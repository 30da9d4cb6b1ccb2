pub mod face_eye_detector;
pub mod object_classifier;
