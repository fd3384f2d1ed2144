//! Asynchronous image textures.
//!
//! A texture starts out pending and is swapped in place when the browser
//! finishes decoding the image. Load callbacks only hold a weak reference to
//! the slot, so a result that arrives after its scene was dropped is ignored.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::error::Result;

pub enum TextureState {
	Pending(String),
	Ready(HtmlImageElement),
	Failed,
}

#[derive(Clone)]
pub struct Texture(Rc<RefCell<TextureState>>);

impl Texture {
	pub fn pending(url: impl Into<String>) -> Self {
		Self(Rc::new(RefCell::new(TextureState::Pending(url.into()))))
	}

	pub fn is_ready(&self) -> bool {
		matches!(*self.0.borrow(), TextureState::Ready(_))
	}

	/// Runs `f` with the decoded image, if there is one yet.
	pub fn with_image<R>(&self, f: impl FnOnce(&HtmlImageElement) -> R) -> Option<R> {
		match &*self.0.borrow() {
			TextureState::Ready(img) => Some(f(img)),
			_ => None,
		}
	}

	/// Starts fetching the image. Returns immediately; the texture stays
	/// pending until the browser calls back.
	pub fn load(&self) -> Result<()> {
		let url = match &*self.0.borrow() {
			TextureState::Pending(url) => url.clone(),
			_ => return Ok(()),
		};

		let img = HtmlImageElement::new()?;
		let (load_slot, error_slot) = (Rc::downgrade(&self.0), Rc::downgrade(&self.0));
		let (loaded, src, failed_src) = (img.clone(), url.clone(), url.clone());

		let on_load = Closure::once_into_js(move || {
			if settle(&load_slot, TextureState::Ready(loaded)) {
				debug!("Texture ready: {src}");
			}
		});
		let on_error = Closure::once_into_js(move || {
			if settle(&error_slot, TextureState::Failed) {
				warn!("Texture failed to load, using flat color: {failed_src}");
			}
		});
		img.set_onload(Some(on_load.unchecked_ref()));
		img.set_onerror(Some(on_error.unchecked_ref()));
		img.set_src(&url);
		Ok(())
	}
}

/// Applies a load result if the texture is still alive and still pending.
fn settle(slot: &Weak<RefCell<TextureState>>, next: TextureState) -> bool {
	let Some(slot) = slot.upgrade() else {
		return false;
	};
	let mut state = slot.borrow_mut();
	if !matches!(*state, TextureState::Pending(_)) {
		return false;
	}
	*state = next;
	true
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn failure_degrades_live_texture() {
		let texture = Texture::pending("/migrated/books-dune.jpg");
		let weak = Rc::downgrade(&texture.0);
		assert!(settle(&weak, TextureState::Failed));
		assert!(matches!(*texture.0.borrow(), TextureState::Failed));
		assert!(!texture.is_ready());
		assert_eq!(texture.with_image(|_| ()), None);
	}

	#[test]
	fn late_result_for_dropped_texture_is_ignored() {
		let texture = Texture::pending("/migrated/books-dune.jpg");
		let weak = Rc::downgrade(&texture.0);
		drop(texture);
		assert!(!settle(&weak, TextureState::Failed));
	}

	#[test]
	fn only_the_first_result_applies() {
		let texture = Texture::pending("/a.png");
		let weak = Rc::downgrade(&texture.0);
		assert!(settle(&weak, TextureState::Failed));
		assert!(!settle(&weak, TextureState::Failed));
	}
}
