//! GL side of the ray background: context, program, and the per-frame draw.

use js_sys::Float32Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlContextAttributes,
    WebGlProgram, WebGlShader, WebGlUniformLocation,
};

use crate::config::RenderConfig;
use crate::error::{InitError, ShaderStage};
use crate::scene::FrameUniforms;
use crate::shaders::{self, FULLSCREEN_TRIANGLE, POSITION_ATTRIBUTE, VERTEX_SHADER};
use crate::surface::SurfaceState;

/// Uniform locations. A location is `None` when the driver optimized the
/// uniform away; uploads to it are then silently skipped.
struct Uniforms {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    pointer: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    spread: Option<WebGlUniformLocation>,
    ray_length: Option<WebGlUniformLocation>,
    distortion: Option<WebGlUniformLocation>,
    mouse_influence: Option<WebGlUniformLocation>,
    saturation: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name: &str| gl.get_uniform_location(program, name);
        Self {
            time: at(shaders::U_TIME),
            resolution: at(shaders::U_RESOLUTION),
            pointer: at(shaders::U_POINTER),
            color: at(shaders::U_COLOR),
            spread: at(shaders::U_SPREAD),
            ray_length: at(shaders::U_RAY_LENGTH),
            distortion: at(shaders::U_DISTORTION),
            mouse_influence: at(shaders::U_MOUSE_INFLUENCE),
            saturation: at(shaders::U_SATURATION),
        }
    }
}

pub struct RayRenderer {
    canvas: HtmlCanvasElement,
    gl: GL,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    uniforms: Uniforms,
}

impl RayRenderer {
    /// Acquire a context on `canvas` and build the program for the
    /// configured variant.
    pub fn initialize(canvas: HtmlCanvasElement, config: &RenderConfig) -> Result<Self, InitError> {
        let fragment = shaders::fragment_source(config.variant);
        Self::initialize_with_sources(canvas, config, VERTEX_SHADER, fragment)
    }

    /// Like [`RayRenderer::initialize`] with a caller-supplied shader pair.
    /// Stops at the first failure without touching the canvas further.
    pub fn initialize_with_sources(
        canvas: HtmlCanvasElement,
        config: &RenderConfig,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self, InitError> {
        let gl = acquire_context(&canvas)?;
        let program = link_program(&gl, vertex, fragment)?;
        gl.use_program(Some(&program));

        let uniforms = Uniforms::locate(&gl, &program);
        let buffer = match upload_triangle(&gl, &program) {
            Ok(buffer) => buffer,
            Err(err) => {
                gl.delete_program(Some(&program));
                return Err(err);
            }
        };

        let renderer = Self {
            canvas,
            gl,
            program,
            buffer,
            uniforms,
        };
        renderer.upload_config(config);
        Ok(renderer)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// CSS box of the canvas as laid out right now.
    pub fn css_size(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.width(), rect.height())
    }

    /// Size the backing store and viewport to `surface`.
    pub fn apply_surface(&self, surface: &SurfaceState) {
        self.canvas.set_width(surface.width);
        self.canvas.set_height(surface.height);
        self.gl
            .viewport(0, 0, surface.width as i32, surface.height as i32);
    }

    pub fn draw(&self, frame: &FrameUniforms) {
        let gl = &self.gl;
        if gl.is_context_lost() {
            return;
        }
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        gl.uniform1f(self.uniforms.time.as_ref(), frame.time);
        gl.uniform2f(
            self.uniforms.resolution.as_ref(),
            frame.resolution[0],
            frame.resolution[1],
        );
        gl.uniform2f(self.uniforms.pointer.as_ref(), frame.pointer[0], frame.pointer[1]);

        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }

    /// Leave the canvas fully transparent.
    pub fn clear(&self) {
        if self.gl.is_context_lost() {
            return;
        }
        self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }

    fn upload_config(&self, config: &RenderConfig) {
        let gl = &self.gl;
        let u = &self.uniforms;
        let [r, g, b] = config.color;
        gl.uniform3f(u.color.as_ref(), r, g, b);
        gl.uniform1f(u.spread.as_ref(), config.spread);
        gl.uniform1f(u.ray_length.as_ref(), config.ray_length);
        gl.uniform1f(u.distortion.as_ref(), config.distortion);
        gl.uniform1f(u.mouse_influence.as_ref(), config.mouse_influence);
        gl.uniform1f(u.saturation.as_ref(), config.saturation);
    }
}

impl Drop for RayRenderer {
    fn drop(&mut self) {
        self.gl.delete_buffer(Some(&self.buffer));
        self.gl.delete_program(Some(&self.program));
    }
}

fn acquire_context(canvas: &HtmlCanvasElement) -> Result<GL, InitError> {
    let attrs = WebGlContextAttributes::new();
    attrs.set_alpha(true);
    attrs.set_premultiplied_alpha(false);
    attrs.set_antialias(true);

    canvas
        .get_context_with_context_options("webgl2", &attrs)
        .map_err(|e| InitError::ContextUnavailable(js_message(&e)))?
        .ok_or_else(|| InitError::ContextUnavailable("WebGL2 not supported".into()))?
        .dyn_into::<GL>()
        .map_err(|_| InitError::ContextUnavailable("context is not WebGL2".into()))
}

fn link_program(gl: &GL, vertex_src: &str, fragment_src: &str) -> Result<WebGlProgram, InitError> {
    let vertex = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
    let fragment = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
        Ok(shader) => shader,
        Err(err) => {
            gl.delete_shader(Some(&vertex));
            return Err(err);
        }
    };

    let program = gl
        .create_program()
        .ok_or_else(|| InitError::ProgramLinkFailed("failed to create program".into()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);

    gl.detach_shader(&program, &vertex);
    gl.detach_shader(&program, &fragment);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if linked {
        Ok(program)
    } else {
        let log = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "unknown program error".into());
        gl.delete_program(Some(&program));
        Err(InitError::ProgramLinkFailed(log))
    }
}

fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader, InitError> {
    let kind = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl.create_shader(kind).ok_or_else(|| InitError::ShaderCompileFailed {
        stage,
        log: "failed to create shader".into(),
    })?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown shader error".into());
        gl.delete_shader(Some(&shader));
        Err(InitError::ShaderCompileFailed { stage, log })
    }
}

fn upload_triangle(gl: &GL, program: &WebGlProgram) -> Result<WebGlBuffer, InitError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| InitError::Resource("failed to create vertex buffer".into()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let vertices = Float32Array::from(&FULLSCREEN_TRIANGLE[..]);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

    let location = gl.get_attrib_location(program, POSITION_ATTRIBUTE);
    if location < 0 {
        gl.delete_buffer(Some(&buffer));
        return Err(InitError::Resource(format!(
            "attribute {POSITION_ATTRIBUTE} not found"
        )));
    }
    let location = location as u32;
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, 2, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
