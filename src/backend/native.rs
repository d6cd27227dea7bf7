//! Native `proc3d_*` backend
//!
//! Loads the animation library at startup and forwards each validated call to
//! it. The library has no query API, so names, groups and the last pose sent
//! per object are tracked on this side.

use std::collections::BTreeMap;
use std::ffi::{c_char, c_double, c_int, c_uint, c_void, CString};
use std::path::Path;

use libloading::Library;

use super::{AxisUpdate, Keying, SceneBackend, SceneQuery};
use crate::config::{Config, ContextSymbols};
use crate::error::{BackendError, StartupError};
use crate::scene::rotation::{euler_from_matrix, matrix_from_euler, rotate_sequential};
use crate::scene::{ColorChannel, SceneError, Shape};

/// `proc3d_send_signal` value that starts the viewer
const SIGNAL_RUN_VIEWER: c_int = 1;

type Handle = *mut c_void;

/// Time argument of the delta operations
pub trait NativeTime: Copy + 'static {
    fn from_frames(time: f64) -> Self;
}

impl NativeTime for c_uint {
    fn from_frames(time: f64) -> Self {
        time.round() as c_uint
    }
}

impl NativeTime for c_double {
    fn from_frames(time: f64) -> Self {
        time
    }
}

type AllocFn = unsafe extern "C" fn() -> Handle;
type FreeFn = unsafe extern "C" fn(Handle);
type NameFn = unsafe extern "C" fn(Handle, *const c_char);
type PairFn = unsafe extern "C" fn(Handle, *const c_char, *const c_char);
type LoadFn = unsafe extern "C" fn(Handle, *const c_char, *const c_char, f64, f64, f64);
type RgbaFn = unsafe extern "C" fn(Handle, *const c_char, f64, f64, f64, f64);
type SphereFn = unsafe extern "C" fn(Handle, *const c_char, f64);
type PlaneFn = unsafe extern "C" fn(Handle, *const c_char, f64, f64);
type BoxFn = unsafe extern "C" fn(Handle, *const c_char, f64, f64, f64, f64, f64, f64);
type AxialFn = unsafe extern "C" fn(Handle, *const c_char, f64, f64, f64, f64, f64);
type Vec3Fn<T> = unsafe extern "C" fn(Handle, *const c_char, f64, f64, f64, T);
type PropertyFn<T> = unsafe extern "C" fn(Handle, *const c_char, *const c_char, f64, T);
type ColorFn<T> = unsafe extern "C" fn(Handle, *const c_char, f64, f64, f64, f64, T);
type SignalFn = unsafe extern "C" fn(Handle, c_int);

/// Resolved entry points; only valid while their library is loaded
struct Proc3d<T> {
    load_object: LoadFn,
    create_group: NameFn,
    create_material: RgbaFn,
    create_sphere: SphereFn,
    create_box: BoxFn,
    create_plane: PlaneFn,
    create_cylinder: AxialFn,
    create_cone: AxialFn,
    add_to_group: PairFn,
    apply_material: PairFn,
    set_rotation_euler: Vec3Fn<T>,
    set_translation: Vec3Fn<T>,
    set_scale: Vec3Fn<T>,
    set_material_property: PropertyFn<T>,
    set_ambient_color: ColorFn<T>,
    set_diffuse_color: ColorFn<T>,
    set_specular_color: ColorFn<T>,
    send_signal: SignalFn,
}

/// Copy a function pointer out of `library`.
///
/// # Safety
/// `F` must match the C signature of `symbol`.
unsafe fn resolve<F: Copy>(library: &Library, symbol: &'static str) -> Result<F, StartupError> {
    let found = library
        .get::<F>(symbol.as_bytes())
        .map_err(|source| StartupError::MissingSymbol { symbol, source })?;
    Ok(*found)
}

impl<T: NativeTime> Proc3d<T> {
    fn open(library: &Library) -> Result<Self, StartupError> {
        unsafe {
            Ok(Self {
                load_object: resolve(library, "proc3d_load_object")?,
                create_group: resolve(library, "proc3d_create_group")?,
                create_material: resolve(library, "proc3d_create_material")?,
                create_sphere: resolve(library, "proc3d_create_sphere")?,
                create_box: resolve(library, "proc3d_create_box")?,
                create_plane: resolve(library, "proc3d_create_plane")?,
                create_cylinder: resolve(library, "proc3d_create_cylinder")?,
                create_cone: resolve(library, "proc3d_create_cone")?,
                add_to_group: resolve(library, "proc3d_add_to_group")?,
                apply_material: resolve(library, "proc3d_apply_material")?,
                set_rotation_euler: resolve(library, "proc3d_set_rotation_euler")?,
                set_translation: resolve(library, "proc3d_set_translation")?,
                set_scale: resolve(library, "proc3d_set_scale")?,
                set_material_property: resolve(library, "proc3d_set_material_property")?,
                set_ambient_color: resolve(library, "proc3d_set_ambient_color")?,
                set_diffuse_color: resolve(library, "proc3d_set_diffuse_color")?,
                set_specular_color: resolve(library, "proc3d_set_specular_color")?,
                send_signal: resolve(library, "proc3d_send_signal")?,
            })
        }
    }

    fn color_fn(&self, channel: ColorChannel) -> ColorFn<T> {
        match channel {
            ColorChannel::Ambient => self.set_ambient_color,
            ColorChannel::Diffuse => self.set_diffuse_color,
            ColorChannel::Specular => self.set_specular_color,
        }
    }
}

/// Opaque animation context, freed exactly once
struct NativeContext {
    handle: Handle,
    free: FreeFn,
}

impl NativeContext {
    fn alloc(library: &Library, symbols: ContextSymbols) -> Result<Self, StartupError> {
        let (alloc, free) = unsafe {
            (
                resolve::<AllocFn>(library, symbols.alloc())?,
                resolve::<FreeFn>(library, symbols.free())?,
            )
        };
        Self::new(alloc, free, symbols.alloc())
    }

    fn new(alloc: AllocFn, free: FreeFn, symbol: &'static str) -> Result<Self, StartupError> {
        let handle = unsafe { alloc() };
        if handle.is_null() {
            return Err(StartupError::NullContext(symbol));
        }
        Ok(Self { handle, free })
    }
}

impl Drop for NativeContext {
    fn drop(&mut self) {
        unsafe { (self.free)(self.handle) };
        log::debug!("[Native] Animation context freed");
    }
}

/// Last values sent for one object
#[derive(Debug, Clone, Copy)]
struct SentPose {
    group: bool,
    location: [f64; 3],
    scale: [f64; 3],
    rotation: [f64; 3],
}

impl SentPose {
    fn new(group: bool) -> Self {
        Self {
            group,
            location: [0.0; 3],
            scale: [1.0; 3],
            rotation: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone)]
struct SentMaterial {
    colors: [[f64; 4]; 3],
    properties: BTreeMap<String, f64>,
}

fn channel_index(channel: ColorChannel) -> usize {
    match channel {
        ColorChannel::Ambient => 0,
        ColorChannel::Diffuse => 1,
        ColorChannel::Specular => 2,
    }
}

pub struct NativeBackend<T: NativeTime> {
    context: NativeContext,
    api: Proc3d<T>,
    objects: BTreeMap<String, SentPose>,
    materials: BTreeMap<String, SentMaterial>,
    // declared last so the context is freed before the library unloads
    _library: Option<Library>,
}

impl<T: NativeTime> NativeBackend<T> {
    /// Load the library named by `config` and allocate the animation context
    pub fn load(config: &Config) -> Result<Self, StartupError> {
        let path = config.native_library()?;
        let library = unsafe { Library::new(&path) }.map_err(|source| StartupError::LibraryLoad {
            path: path.clone(),
            source,
        })?;
        log::info!("[Native] Loaded {}", path.display());

        let api = Proc3d::open(&library)?;
        let context = NativeContext::alloc(&library, config.context)?;
        Ok(Self::from_parts(context, api, Some(library)))
    }

    fn from_parts(context: NativeContext, api: Proc3d<T>, library: Option<Library>) -> Self {
        Self {
            context,
            api,
            objects: BTreeMap::new(),
            materials: BTreeMap::new(),
            _library: library,
        }
    }

    fn register(&mut self, reference: &str, group: bool) -> Result<(), BackendError> {
        if self.objects.contains_key(reference) {
            return Err(SceneError::NameClash(reference.to_string()).into());
        }
        self.objects.insert(reference.to_string(), SentPose::new(group));
        Ok(())
    }

    fn pose(&self, reference: &str) -> Result<SentPose, BackendError> {
        self.objects
            .get(reference)
            .copied()
            .ok_or_else(|| BackendError::UnknownObject(reference.to_string()))
    }

    fn material(&mut self, reference: &str) -> Result<&mut SentMaterial, BackendError> {
        self.materials
            .get_mut(reference)
            .ok_or_else(|| BackendError::UnknownMaterial(reference.to_string()))
    }

    /// Send `next`, preceded by `previous` one frame earlier when holding
    fn send_vec3(
        &self,
        call: Vec3Fn<T>,
        name: &CString,
        previous: [f64; 3],
        next: [f64; 3],
        keying: Keying,
    ) {
        let ctx = self.context.handle;
        unsafe {
            if keying.immediate && keying.time >= 1.0 {
                let [x, y, z] = previous;
                call(ctx, name.as_ptr(), x, y, z, T::from_frames(keying.time - 1.0));
            }
            let [x, y, z] = next;
            call(ctx, name.as_ptr(), x, y, z, T::from_frames(keying.time));
        }
    }
}

impl<T: NativeTime> SceneQuery for NativeBackend<T> {
    fn has_object(&self, reference: &str) -> bool {
        self.objects.contains_key(reference)
    }

    fn has_material(&self, reference: &str) -> bool {
        self.materials.contains_key(reference)
    }

    fn is_group(&self, reference: &str) -> bool {
        self.objects.get(reference).is_some_and(|o| o.group)
    }
}

impl<T: NativeTime> SceneBackend for NativeBackend<T> {
    fn label(&self) -> &'static str {
        "native"
    }

    fn create_shape(&mut self, reference: &str, shape: Shape) -> Result<(), BackendError> {
        let name = CString::new(reference)?;
        let group = matches!(shape, Shape::Group);
        let ctx = self.context.handle;
        let api = &self.api;
        unsafe {
            match shape {
                Shape::Box {
                    width,
                    length,
                    height,
                    axis: [tx, ty, tz],
                } => (api.create_box)(ctx, name.as_ptr(), tx, ty, tz, width, length, height),
                Shape::Cone {
                    radius,
                    height,
                    axis: [tx, ty, tz],
                } => (api.create_cone)(ctx, name.as_ptr(), tx, ty, tz, height, radius),
                Shape::Sphere { radius } => (api.create_sphere)(ctx, name.as_ptr(), radius),
                Shape::Cylinder {
                    radius,
                    height,
                    axis: [tx, ty, tz],
                } => (api.create_cylinder)(ctx, name.as_ptr(), tx, ty, tz, height, radius),
                Shape::Plane { width, length } => (api.create_plane)(ctx, name.as_ptr(), width, length),
                Shape::Group => (api.create_group)(ctx, name.as_ptr()),
                Shape::Mesh { .. } => return Err(BackendError::Unsupported("mesh shapes")),
            }
        }
        self.register(reference, group)
    }

    fn update_shape(&mut self, _reference: &str, _shape: Shape) -> Result<(), BackendError> {
        Err(BackendError::Unsupported("update_shape"))
    }

    fn add_to_group(&mut self, reference: &str, group: &str) -> Result<(), BackendError> {
        self.pose(reference)?;
        let (name, target) = (CString::new(reference)?, CString::new(group)?);
        unsafe { (self.api.add_to_group)(self.context.handle, name.as_ptr(), target.as_ptr()) };
        Ok(())
    }

    fn set_translation(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let pose = self.pose(reference)?;
        let name = CString::new(reference)?;
        let next = update.apply(pose.location);
        self.send_vec3(self.api.set_translation, &name, pose.location, next, keying);
        if let Some(sent) = self.objects.get_mut(reference) {
            sent.location = next;
        }
        Ok(())
    }

    fn set_scale(
        &mut self,
        reference: &str,
        update: AxisUpdate,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let pose = self.pose(reference)?;
        let name = CString::new(reference)?;
        let next = update.apply(pose.scale);
        self.send_vec3(self.api.set_scale, &name, pose.scale, next, keying);
        if let Some(sent) = self.objects.get_mut(reference) {
            sent.scale = next;
        }
        Ok(())
    }

    fn rotate(
        &mut self,
        reference: &str,
        euler: [f64; 3],
        keying: Keying,
    ) -> Result<(), BackendError> {
        let pose = self.pose(reference)?;
        let name = CString::new(reference)?;
        let next = euler_from_matrix(&rotate_sequential(&matrix_from_euler(pose.rotation), euler));
        self.send_vec3(self.api.set_rotation_euler, &name, pose.rotation, next, keying);
        if let Some(sent) = self.objects.get_mut(reference) {
            sent.rotation = next;
        }
        Ok(())
    }

    fn create_material(&mut self, reference: &str, color: [f64; 4]) -> Result<(), BackendError> {
        if self.materials.contains_key(reference) {
            return Err(SceneError::NameClash(reference.to_string()).into());
        }
        let name = CString::new(reference)?;
        let [r, g, b, a] = color;
        unsafe { (self.api.create_material)(self.context.handle, name.as_ptr(), r, g, b, a) };
        self.materials.insert(
            reference.to_string(),
            SentMaterial {
                colors: [color; 3],
                properties: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn apply_material(&mut self, reference: &str, material: &str) -> Result<(), BackendError> {
        self.pose(reference)?;
        if !self.materials.contains_key(material) {
            return Err(BackendError::UnknownMaterial(material.to_string()));
        }
        let (name, target) = (CString::new(reference)?, CString::new(material)?);
        unsafe { (self.api.apply_material)(self.context.handle, name.as_ptr(), target.as_ptr()) };
        Ok(())
    }

    fn set_material_property(
        &mut self,
        reference: &str,
        property: &str,
        value: f64,
        keying: Keying,
    ) -> Result<(), BackendError> {
        let (name, prop) = (CString::new(reference)?, CString::new(property)?);
        let call = self.api.set_material_property;
        let ctx = self.context.handle;
        let previous = self
            .material(reference)?
            .properties
            .insert(property.to_string(), value);
        unsafe {
            if let (Some(previous), true) = (previous, keying.immediate && keying.time >= 1.0) {
                call(ctx, name.as_ptr(), prop.as_ptr(), previous, T::from_frames(keying.time - 1.0));
            }
            call(ctx, name.as_ptr(), prop.as_ptr(), value, T::from_frames(keying.time));
        }
        Ok(())
    }

    fn set_color(
        &mut self,
        reference: &str,
        channel: ColorChannel,
        color: [f64; 4],
        keying: Keying,
    ) -> Result<(), BackendError> {
        let name = CString::new(reference)?;
        let call = self.api.color_fn(channel);
        let ctx = self.context.handle;
        let slot = &mut self.material(reference)?.colors[channel_index(channel)];
        let previous = std::mem::replace(slot, color);
        unsafe {
            if keying.immediate && keying.time >= 1.0 {
                let [r, g, b, a] = previous;
                call(ctx, name.as_ptr(), r, g, b, a, T::from_frames(keying.time - 1.0));
            }
            let [r, g, b, a] = color;
            call(ctx, name.as_ptr(), r, g, b, a, T::from_frames(keying.time));
        }
        Ok(())
    }

    fn load_object(
        &mut self,
        reference: &str,
        path: &Path,
        offset: [f64; 3],
    ) -> Result<(), BackendError> {
        let name = CString::new(reference)?;
        let file = CString::new(path.to_string_lossy().into_owned())?;
        let [x, y, z] = offset;
        unsafe { (self.api.load_object)(self.context.handle, name.as_ptr(), file.as_ptr(), x, y, z) };
        self.register(reference, true)?;
        if let Some(sent) = self.objects.get_mut(reference) {
            sent.location = offset;
        }
        Ok(())
    }

    fn hand_off(self, _config: &Config) -> Result<(), BackendError> {
        log::info!(
            "[Native] Animation finished with {} object(s), starting viewer",
            self.objects.len()
        );
        unsafe { (self.api.send_signal)(self.context.handle, SIGNAL_RUN_VIEWER) };
        // context freed on drop
        Ok(())
    }
}
